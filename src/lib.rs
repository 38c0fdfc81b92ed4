//! stagekit is the composition engine behind a timed, canvas-based video editor.
//!
//! It owns the data model and runtime that place visual elements on a stage, nest them into
//! groups, animate them over time, and let third-party widgets extend the element set with
//! schema-validated parameters. Pixels are someone else's job: the output of this crate is a flat,
//! painter-ordered list of [`DrawRecord`]s for one instant.
//!
//! # Pipeline overview
//!
//! 1. **Author**: build a [`Clip`] with variant constructors ([`Element::text`],
//!    [`Element::group`], ...), validated setters, [`Clip::set_children`] and
//!    [`Element::add_animation`].
//! 2. **Register**: load [`WidgetDefinition`]s into a [`WidgetRegistry`].
//! 3. **Resolve**: [`Composer::resolve`] walks the tree at time `T` and returns draw records with
//!    world transforms, animated properties and resolved widget parameters.
//! 4. **Persist** (optional): [`Clip::to_json`] / [`Clip::from_json`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure resolution**: resolving the same clip at the same time always yields the same records.
//! - **Fail fast**: every mutation validates before committing; a failed call changes nothing.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod clip;
mod element;
mod foundation;
mod transform;
mod widget;

pub use animation::ease::Ease;
pub use animation::kind::{Animation, AnimationKind, Direction};
pub use animation::scheduler::{
    AnimationPhase, PhaseState, animation_state, apply_effect, resolve_geometry,
};
pub use clip::composer::{
    ComposerOpts, Composer, DrawPayload, DrawRecord, ResolveThreading, ResolvedPhase,
    ResolvedWidget, resolve,
};
pub use clip::document::{AnimationDocument, ClipDocument, ContentDocument, ElementDocument};
pub use clip::model::Clip;
pub use element::model::{
    Element, ElementKind, ElementVariant, EmojiProps, ImageProps, LottieProps, PlayPayload,
    ShapeKind, ShapeProps, TextAlign, TextProps, TextStyle, VideoProps, WidgetPhase, WidgetProps,
};
pub use element::tree::{ElementTree, Preorder};
pub use foundation::core::{Affine, Canvas, Point, Size, TimeRange, Vec2};
pub use foundation::error::{StageError, StageResult};
pub use foundation::ids::{AnimationId, ElementId};
pub use transform::placement::{Geometry, PlacementFlags, placement_affine, resolve_size};
pub use widget::definition::{
    SchemaSection, SchemaSectionDoc, WidgetDefinition, WidgetDefinitionDoc,
    parse_widget_definitions,
};
pub use widget::registry::{InspectorMetadata, ResolvedParameters, SectionMetadata, WidgetRegistry};
pub use widget::schema::{FieldKind, FieldMeta, FieldSpec, ObjectSchema, ParamSchema, UnknownFields};
