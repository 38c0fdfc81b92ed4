//! Placement math: static geometry plus origin/anchor flags to an affine transform.

use crate::foundation::core::{Affine, Size, Vec2};
use crate::foundation::error::{StageError, StageResult, ensure_finite};

/// Geometry of an element, before or after animation.
///
/// This is also the property set animations read and write.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Geometry {
    /// Horizontal position of the element origin.
    pub x: f64,
    /// Vertical position of the element origin.
    pub y: f64,
    /// Width; `None` means intrinsic/auto.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height; `None` means intrinsic/auto.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

impl Geometry {
    /// Check every field's type/range constraint.
    pub fn validate(&self) -> StageResult<()> {
        ensure_finite("x", self.x)?;
        ensure_finite("y", self.y)?;
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)?;
        ensure_finite("rotation", self.rotation)?;
        if ensure_finite("scale", self.scale)? < 0.0 {
            return Err(StageError::validation_at("$.scale", "must be >= 0"));
        }
        check_opacity(self.opacity)
    }
}

pub(crate) fn check_dimension(field: &str, v: Option<f64>) -> StageResult<()> {
    if let Some(v) = v
        && ensure_finite(field, v)? < 0.0
    {
        return Err(StageError::validation_at(
            format!("$.{field}"),
            "must be >= 0",
        ));
    }
    Ok(())
}

pub(crate) fn check_opacity(v: f64) -> StageResult<()> {
    let v = ensure_finite("opacity", v)?;
    if !(0.0..=1.0).contains(&v) {
        return Err(StageError::validation_at(
            "$.opacity",
            format!("must be within [0, 1], got {v}"),
        ));
    }
    Ok(())
}

/// Origin/anchor/ratio flags of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementFlags {
    /// Keep the intrinsic aspect ratio when only one dimension is set.
    #[serde(default)]
    pub keep_ratio: bool,
    /// The element's own origin is its center instead of its top-left corner.
    #[serde(default)]
    pub origin_center: bool,
    /// `(x, y)` is relative to the reference box center instead of its top-left corner.
    #[serde(default)]
    pub anchor_to_center: bool,
}

/// Resolve the effective width/height.
///
/// With `keep_ratio` and exactly one dimension set, the other is derived from `intrinsic_ratio`
/// (`width / height`); if no ratio is known that is a validation error.
pub fn resolve_size(
    width: Option<f64>,
    height: Option<f64>,
    keep_ratio: bool,
    intrinsic_ratio: Option<f64>,
) -> StageResult<(Option<f64>, Option<f64>)> {
    if !keep_ratio {
        return Ok((width, height));
    }
    let ratio = || {
        intrinsic_ratio.filter(|r| r.is_finite() && *r > 0.0).ok_or_else(|| {
            StageError::validation(
                "keepRatio needs an intrinsic aspect ratio when only one of width/height is set",
            )
        })
    };
    match (width, height) {
        (Some(w), None) => Ok((Some(w), Some(w / ratio()?))),
        (None, Some(h)) => Ok((Some(ratio()? * h), Some(h))),
        other => Ok(other),
    }
}

/// Affine placing an element inside its reference box.
///
/// `translate(anchor + (x, y)) * rotate(rotation) * scale(scale) * translate(-origin)`, so the
/// element's origin lands on `(x, y)` and rotation/scale pivot about it.
pub fn placement_affine(
    geometry: &Geometry,
    size: (Option<f64>, Option<f64>),
    flags: PlacementFlags,
    reference: Size,
) -> Affine {
    let anchor = if flags.anchor_to_center {
        reference.center()
    } else {
        Vec2::ZERO
    };
    let origin = if flags.origin_center {
        Vec2::new(size.0.unwrap_or(0.0) / 2.0, size.1.unwrap_or(0.0) / 2.0)
    } else {
        Vec2::ZERO
    };

    Affine::translate(anchor + Vec2::new(geometry.x, geometry.y))
        * Affine::rotate(geometry.rotation.to_radians())
        * Affine::scale(geometry.scale)
        * Affine::translate(-origin)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/placement.rs"]
mod tests;
