use crate::foundation::error::{StageError, StageResult, ensure_finite};

pub use kurbo::{Affine, Point, Vec2};

/// Stage dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Stage width.
    pub width: u32,
    /// Stage height.
    pub height: u32,
}

impl Canvas {
    /// Validated constructor; both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> StageResult<Self> {
        if width == 0 || height == 0 {
            return Err(StageError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Stage size as floating point box.
    pub fn size(self) -> Size {
        Size {
            width: f64::from(self.width),
            height: f64::from(self.height),
        }
    }
}

/// A width/height pair in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Validated constructor; both dimensions must be finite and > 0.
    pub fn new(width: f64, height: f64) -> StageResult<Self> {
        let s = Self { width, height };
        s.validate("size")?;
        Ok(s)
    }

    /// `width / height`.
    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }

    /// Center point of a box of this size anchored at the origin.
    pub fn center(self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub(crate) fn validate(self, field: &str) -> StageResult<()> {
        ensure_finite(&format!("{field}.width"), self.width)?;
        ensure_finite(&format!("{field}.height"), self.height)?;
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(StageError::validation_at(
                format!("$.{field}"),
                "width and height must be > 0",
            ));
        }
        Ok(())
    }
}

/// Closed time range `[start, end]` in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Range start.
    pub start: f64,
    /// Range end (inclusive).
    pub end: f64,
}

impl TimeRange {
    /// Validated constructor. Non-finite bounds are a validation error, `end < start` an
    /// [`StageError::InvalidRange`].
    pub fn new(start: f64, end: f64) -> StageResult<Self> {
        ensure_finite("startTime", start)?;
        ensure_finite("endTime", end)?;
        if end < start {
            return Err(StageError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Length of the range.
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` lies inside the closed range.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Linear progress of `t` through the range, clamped to `[0, 1]`.
    ///
    /// A zero-length range is a step at `start`: 0 before it, 1 from it on.
    pub fn progress(self, t: f64) -> f64 {
        let dur = self.duration();
        if dur <= 0.0 {
            return if t < self.start { 0.0 } else { 1.0 };
        }
        ((t - self.start) / dur).clamp(0.0, 1.0)
    }
}

/// `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub(crate) fn is_hex_color(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
