use crate::foundation::error::{StageError, StageResult};

/// Easing functions mapping linear animation progress to eased progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Identity.
    #[default]
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Ease {
    /// Eased progress for linear progress `t`; `t` is clamped to `[0, 1]` first.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t.powi(2),
            Self::OutQuad => ease_out(t, 2),
            Self::InOutQuad => ease_in_out(t, 2),
            Self::InCubic => t.powi(3),
            Self::OutCubic => ease_out(t, 3),
            Self::InOutCubic => ease_in_out(t, 3),
        }
    }

    /// Parse an ease name; accepts `OutCubic`, `outCubic` and `out_cubic`.
    pub fn parse(name: &str) -> StageResult<Self> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(match key.as_str() {
            "linear" => Self::Linear,
            "inquad" => Self::InQuad,
            "outquad" => Self::OutQuad,
            "inoutquad" => Self::InOutQuad,
            "incubic" => Self::InCubic,
            "outcubic" => Self::OutCubic,
            "inoutcubic" => Self::InOutCubic,
            _ => {
                return Err(StageError::validation_at(
                    "$.ease",
                    format!("unknown ease '{name}'"),
                ));
            }
        })
    }
}

/// `t^n` mirrored through `(0.5, 0.5)`.
fn ease_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

/// `t^n` squeezed into the first half and its mirror into the second.
fn ease_in_out(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        0.5 * (2.0 * t).powi(n)
    } else {
        1.0 - 0.5 * (2.0 - 2.0 * t).powi(n)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
