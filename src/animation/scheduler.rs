//! Time-driven evaluation of animations against element geometry.
//!
//! Evaluation is stateless: the phase and progress of every animation are pure functions of the
//! query time, so resolving the same time twice yields the same geometry.

use std::f64::consts::PI;

use crate::{
    animation::ease::Ease,
    animation::kind::{Animation, AnimationKind},
    foundation::core::TimeRange,
    transform::placement::Geometry,
};

/// Lifecycle of an animation relative to a query time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationPhase {
    /// Before the range; contributes its rest state.
    Pending,
    /// Inside the range; interpolates.
    Active,
    /// After the range; contributes its settled state.
    Complete,
}

/// Phase plus eased progress at one instant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseState {
    /// Lifecycle phase.
    pub phase: AnimationPhase,
    /// Eased progress in `[0, 1]` (0 while pending, 1 once complete).
    pub progress: f64,
}

impl PhaseState {
    /// Evaluate `range` with `ease` at time `t`.
    ///
    /// A zero-length range is a step: pending before `start`, complete from `start` on.
    pub fn at(range: TimeRange, ease: Ease, t: f64) -> Self {
        if range.duration() == 0.0 {
            return if t < range.start {
                Self::pending()
            } else {
                Self::complete()
            };
        }
        if t < range.start {
            Self::pending()
        } else if t > range.end {
            Self::complete()
        } else {
            Self {
                phase: AnimationPhase::Active,
                progress: ease.apply(range.progress(t)),
            }
        }
    }

    fn pending() -> Self {
        Self {
            phase: AnimationPhase::Pending,
            progress: 0.0,
        }
    }

    fn complete() -> Self {
        Self {
            phase: AnimationPhase::Complete,
            progress: 1.0,
        }
    }
}

/// State of `animation` at element-local time `t`.
///
/// Animations are range-checked when attached, so a reversed range here is treated as a step at
/// `start_time`.
pub fn animation_state(animation: &Animation, t: f64) -> PhaseState {
    let range = animation.range().unwrap_or(TimeRange {
        start: animation.start_time,
        end: animation.start_time,
    });
    PhaseState::at(range, animation.effective_ease(), t)
}

/// Apply one animation effect with eased progress `p` onto `g`.
pub fn apply_effect(kind: &AnimationKind, p: f64, g: &mut Geometry) {
    match *kind {
        AnimationKind::FadeIn => g.opacity *= p,
        AnimationKind::FadeOut => g.opacity *= 1.0 - p,
        AnimationKind::SlideIn {
            direction,
            distance,
        } => {
            let off = direction.unit() * (distance * (1.0 - p));
            g.x += off.x;
            g.y += off.y;
        }
        AnimationKind::SlideOut {
            direction,
            distance,
        } => {
            let off = direction.unit() * (distance * p);
            g.x += off.x;
            g.y += off.y;
        }
        AnimationKind::ZoomIn { from_scale } => g.scale *= lerp(from_scale, 1.0, p),
        AnimationKind::ZoomOut { to_scale } => g.scale *= lerp(1.0, to_scale, p),
        AnimationKind::Spin { degrees } => g.rotation += degrees * p,
        AnimationKind::Move { dx, dy } => {
            g.x += dx * p;
            g.y += dy * p;
        }
        AnimationKind::Pulse { amount } => g.scale *= 1.0 + amount * (PI * p).sin(),
    }
}

/// Compose `animations` in order over `base` at element-local time `t`.
pub fn resolve_geometry(base: &Geometry, animations: &[Animation], t: f64) -> Geometry {
    let mut g = *base;
    for a in animations {
        let state = animation_state(a, t);
        apply_effect(&a.kind, state.progress, &mut g);
    }
    g.opacity = g.opacity.clamp(0.0, 1.0);
    g.scale = g.scale.max(0.0);
    g
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;
