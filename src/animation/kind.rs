use serde_json::{Map, Value};

use crate::{
    animation::ease::Ease,
    foundation::core::{TimeRange, Vec2},
    foundation::error::{StageError, StageResult, ensure_finite},
    foundation::ids::AnimationId,
};

/// Screen direction used by slide animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards negative x.
    Left,
    /// Towards positive x.
    Right,
    /// Towards negative y.
    Up,
    /// Towards positive y.
    Down,
}

impl Direction {
    /// Unit vector pointing in this direction (y grows downwards).
    pub fn unit(self) -> Vec2 {
        match self {
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "up" | "top" => Some(Self::Up),
            "down" | "bottom" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Built-in animation kinds with their type-specific parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationKind {
    /// Opacity ramps from 0 to the element's opacity.
    FadeIn,
    /// Opacity ramps from the element's opacity to 0.
    FadeOut,
    /// Element arrives from `distance` pixels off in `direction`.
    SlideIn {
        /// Side the element comes from.
        direction: Direction,
        /// Travel in pixels.
        distance: f64,
    },
    /// Element leaves `distance` pixels towards `direction`.
    SlideOut {
        /// Side the element leaves towards.
        direction: Direction,
        /// Travel in pixels.
        distance: f64,
    },
    /// Scale grows from `from_scale` to 1 (multiplied into the element scale).
    ZoomIn {
        /// Starting scale factor.
        from_scale: f64,
    },
    /// Scale shrinks from 1 to `to_scale`.
    ZoomOut {
        /// Final scale factor.
        to_scale: f64,
    },
    /// Adds `degrees` of rotation over the range.
    Spin {
        /// Total rotation in degrees.
        degrees: f64,
    },
    /// Translates by `(dx, dy)` over the range.
    Move {
        /// Horizontal travel.
        dx: f64,
        /// Vertical travel.
        dy: f64,
    },
    /// Scale bumps up by `amount` and returns to rest.
    Pulse {
        /// Peak relative scale increase.
        amount: f64,
    },
}

const DEFAULT_SLIDE_DISTANCE: f64 = 100.0;

impl AnimationKind {
    /// Canonical `type` string, as persisted.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::FadeIn => "FadeIn",
            Self::FadeOut => "FadeOut",
            Self::SlideIn { .. } => "SlideIn",
            Self::SlideOut { .. } => "SlideOut",
            Self::ZoomIn { .. } => "ZoomIn",
            Self::ZoomOut { .. } => "ZoomOut",
            Self::Spin { .. } => "Spin",
            Self::Move { .. } => "Move",
            Self::Pulse { .. } => "Pulse",
        }
    }

    /// Easing applied when the animation does not set one.
    pub fn default_ease(&self) -> Ease {
        match self {
            Self::FadeIn | Self::FadeOut | Self::Pulse { .. } => Ease::Linear,
            Self::SlideIn { .. } => Ease::OutCubic,
            Self::SlideOut { .. } => Ease::InCubic,
            Self::ZoomIn { .. } => Ease::OutQuad,
            Self::ZoomOut { .. } => Ease::InQuad,
            Self::Spin { .. } => Ease::InOutQuad,
            Self::Move { .. } => Ease::InOutCubic,
        }
    }

    /// Parse a kind from its `type` string and parameter object.
    ///
    /// Unknown types fail with [`StageError::UnsupportedAnimation`]; unknown or ill-typed
    /// parameters fail with a validation error at the parameter's path.
    pub fn parse(type_name: &str, params: &Map<String, Value>) -> StageResult<Self> {
        let key: String = type_name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let mut p = Params::new(params);
        let kind = match key.as_str() {
            "fadein" => Self::FadeIn,
            "fadeout" => Self::FadeOut,
            "slidein" => Self::SlideIn {
                direction: p.direction("direction", Direction::Left)?,
                distance: p.num("distance", DEFAULT_SLIDE_DISTANCE)?,
            },
            "slideout" => Self::SlideOut {
                direction: p.direction("direction", Direction::Right)?,
                distance: p.num("distance", DEFAULT_SLIDE_DISTANCE)?,
            },
            "zoomin" => Self::ZoomIn {
                from_scale: p.num("fromScale", 0.0)?,
            },
            "zoomout" => Self::ZoomOut {
                to_scale: p.num("toScale", 0.0)?,
            },
            "spin" => Self::Spin {
                degrees: p.num("degrees", 360.0)?,
            },
            "move" => Self::Move {
                dx: p.num("dx", 0.0)?,
                dy: p.num("dy", 0.0)?,
            },
            "pulse" => Self::Pulse {
                amount: p.num("amount", 0.1)?,
            },
            _ => return Err(StageError::UnsupportedAnimation(type_name.to_owned())),
        };
        p.finish()?;
        kind.validate()?;
        Ok(kind)
    }

    /// Type-specific parameters as a JSON object (inverse of [`AnimationKind::parse`]).
    pub fn params(&self) -> Map<String, Value> {
        let mut m = Map::new();
        match *self {
            Self::FadeIn | Self::FadeOut => {}
            Self::SlideIn {
                direction,
                distance,
            }
            | Self::SlideOut {
                direction,
                distance,
            } => {
                m.insert("direction".into(), Value::from(direction.as_str()));
                m.insert("distance".into(), Value::from(distance));
            }
            Self::ZoomIn { from_scale } => {
                m.insert("fromScale".into(), Value::from(from_scale));
            }
            Self::ZoomOut { to_scale } => {
                m.insert("toScale".into(), Value::from(to_scale));
            }
            Self::Spin { degrees } => {
                m.insert("degrees".into(), Value::from(degrees));
            }
            Self::Move { dx, dy } => {
                m.insert("dx".into(), Value::from(dx));
                m.insert("dy".into(), Value::from(dy));
            }
            Self::Pulse { amount } => {
                m.insert("amount".into(), Value::from(amount));
            }
        }
        m
    }

    pub(crate) fn validate(&self) -> StageResult<()> {
        match *self {
            Self::FadeIn | Self::FadeOut => Ok(()),
            Self::SlideIn { distance, .. } | Self::SlideOut { distance, .. } => {
                ensure_finite("distance", distance).map(drop)
            }
            Self::ZoomIn { from_scale } => non_negative("fromScale", from_scale),
            Self::ZoomOut { to_scale } => non_negative("toScale", to_scale),
            Self::Spin { degrees } => ensure_finite("degrees", degrees).map(drop),
            Self::Move { dx, dy } => {
                ensure_finite("dx", dx)?;
                ensure_finite("dy", dy).map(drop)
            }
            Self::Pulse { amount } => ensure_finite("amount", amount).map(drop),
        }
    }
}

fn non_negative(field: &str, v: f64) -> StageResult<()> {
    if ensure_finite(field, v)? < 0.0 {
        return Err(StageError::validation_at(
            format!("$.{field}"),
            "must be >= 0",
        ));
    }
    Ok(())
}

struct Params<'a> {
    raw: &'a Map<String, Value>,
    seen: Vec<&'static str>,
}

impl<'a> Params<'a> {
    fn new(raw: &'a Map<String, Value>) -> Self {
        Self {
            raw,
            seen: Vec::new(),
        }
    }

    fn num(&mut self, key: &'static str, default: f64) -> StageResult<f64> {
        self.seen.push(key);
        match self.raw.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => v
                .as_f64()
                .ok_or_else(|| StageError::validation_at(format!("$.{key}"), "expected a number")),
        }
    }

    fn direction(&mut self, key: &'static str, default: Direction) -> StageResult<Direction> {
        self.seen.push(key);
        match self.raw.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::String(s)) => Direction::parse(s).ok_or_else(|| {
                StageError::validation_at(format!("$.{key}"), format!("unknown direction '{s}'"))
            }),
            Some(_) => Err(StageError::validation_at(
                format!("$.{key}"),
                "expected a direction string",
            )),
        }
    }

    fn finish(self) -> StageResult<()> {
        match self.raw.keys().find(|k| !self.seen.contains(&k.as_str())) {
            Some(k) => Err(StageError::validation_at(
                format!("$.{k}"),
                "unknown animation parameter",
            )),
            None => Ok(()),
        }
    }
}

/// A time-ranged effect attached to an element.
///
/// `start_time`/`end_time` are in seconds on the owning element's local timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    /// Instance identity; clones share it.
    pub id: AnimationId,
    /// Effect kind and its parameters.
    pub kind: AnimationKind,
    /// Range start (element-local seconds).
    pub start_time: f64,
    /// Range end (element-local seconds).
    pub end_time: f64,
    /// Easing override; `None` uses [`AnimationKind::default_ease`].
    pub ease: Option<Ease>,
}

impl Animation {
    /// New animation instance with a fresh id. The range is checked when it is attached.
    pub fn new(kind: AnimationKind, start_time: f64, end_time: f64) -> Self {
        Self {
            id: AnimationId::generate(),
            kind,
            start_time,
            end_time,
            ease: None,
        }
    }

    /// Shorthand for [`AnimationKind::FadeIn`].
    pub fn fade_in(start_time: f64, end_time: f64) -> Self {
        Self::new(AnimationKind::FadeIn, start_time, end_time)
    }

    /// Shorthand for [`AnimationKind::FadeOut`].
    pub fn fade_out(start_time: f64, end_time: f64) -> Self {
        Self::new(AnimationKind::FadeOut, start_time, end_time)
    }

    /// Parse from a `type` string and a JSON parameter object.
    pub fn parse(
        type_name: &str,
        start_time: f64,
        end_time: f64,
        params: &Value,
    ) -> StageResult<Self> {
        let empty = Map::new();
        let params = match params {
            Value::Null => &empty,
            Value::Object(m) => m,
            _ => {
                return Err(StageError::validation(
                    "animation params must be an object",
                ));
            }
        };
        let kind = AnimationKind::parse(type_name, params)?;
        Ok(Self::new(kind, start_time, end_time))
    }

    /// Set an explicit easing.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    /// Copy with a fresh instance id, so it may be attached next to the original.
    pub fn duplicate(&self) -> Self {
        Self {
            id: AnimationId::generate(),
            ..self.clone()
        }
    }

    /// Checked time range.
    pub fn range(&self) -> StageResult<TimeRange> {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Easing actually used for interpolation.
    pub fn effective_ease(&self) -> Ease {
        self.ease.unwrap_or_else(|| self.kind.default_ease())
    }

    pub(crate) fn validate(&self) -> StageResult<()> {
        self.range()?;
        self.kind.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/kind.rs"]
mod tests;
