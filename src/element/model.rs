use serde_json::{Map, Value};

use crate::{
    animation::ease::Ease,
    animation::kind::Animation,
    foundation::core::{Size, is_hex_color},
    foundation::error::{StageError, StageResult, ensure_finite},
    foundation::ids::{AnimationId, ElementId},
    transform::placement::{Geometry, PlacementFlags, check_dimension, check_opacity, resolve_size},
};

/// Variant tag of an element, without payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementVariant {
    /// [`TextProps`].
    Text,
    /// [`ImageProps`].
    Image,
    /// [`VideoProps`].
    Video,
    /// [`EmojiProps`].
    Emoji,
    /// [`ShapeProps`].
    Shape,
    /// [`LottieProps`].
    Lottie,
    /// Container of child elements.
    Group,
    /// [`WidgetProps`].
    Widget,
}

/// Variant payload of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Text run.
    Text(TextProps),
    /// Raster image by URL.
    Image(ImageProps),
    /// Video by URL.
    Video(VideoProps),
    /// Single emoji glyph.
    Emoji(EmojiProps),
    /// Vector primitive.
    Shape(ShapeProps),
    /// Lottie animation by URL.
    Lottie(LottieProps),
    /// Container; its ordered children are owned by the clip's tree.
    Group,
    /// Externally defined widget instance.
    Widget(WidgetProps),
}

impl ElementKind {
    /// Variant tag.
    pub fn variant(&self) -> ElementVariant {
        match self {
            Self::Text(_) => ElementVariant::Text,
            Self::Image(_) => ElementVariant::Image,
            Self::Video(_) => ElementVariant::Video,
            Self::Emoji(_) => ElementVariant::Emoji,
            Self::Shape(_) => ElementVariant::Shape,
            Self::Lottie(_) => ElementVariant::Lottie,
            Self::Group => ElementVariant::Group,
            Self::Widget(_) => ElementVariant::Widget,
        }
    }

    /// Intrinsic `width / height`, when the content has one.
    pub fn intrinsic_ratio(&self) -> Option<f64> {
        match self {
            Self::Image(p) => p.intrinsic_size.map(Size::aspect_ratio),
            Self::Video(p) => p.intrinsic_size.map(Size::aspect_ratio),
            Self::Lottie(p) => p.intrinsic_size.map(Size::aspect_ratio),
            Self::Emoji(_) => Some(1.0),
            Self::Text(_) | Self::Shape(_) | Self::Group | Self::Widget(_) => None,
        }
    }

    pub(crate) fn validate(&self) -> StageResult<()> {
        match self {
            Self::Text(p) => p.validate(),
            Self::Image(p) => {
                check_url("url", &p.url)?;
                check_intrinsic(p.intrinsic_size)
            }
            Self::Video(p) => {
                check_url("url", &p.url)?;
                check_unit("volume", p.volume)?;
                check_intrinsic(p.intrinsic_size)
            }
            Self::Emoji(p) => {
                if p.emoji.trim().is_empty() {
                    return Err(StageError::validation_at("$.emoji", "must be non-empty"));
                }
                Ok(())
            }
            Self::Shape(p) => p.validate(),
            Self::Lottie(p) => {
                check_url("url", &p.url)?;
                if ensure_finite("speed", p.speed)? <= 0.0 {
                    return Err(StageError::validation_at("$.speed", "must be > 0"));
                }
                check_intrinsic(p.intrinsic_size)
            }
            Self::Group => Ok(()),
            Self::Widget(p) => p.validate(),
        }
    }
}

fn check_url(field: &str, url: &str) -> StageResult<()> {
    if url.trim().is_empty() {
        return Err(StageError::validation_at(
            format!("$.{field}"),
            "must be non-empty",
        ));
    }
    Ok(())
}

fn check_unit(field: &str, v: f64) -> StageResult<()> {
    if !(0.0..=1.0).contains(&ensure_finite(field, v)?) {
        return Err(StageError::validation_at(
            format!("$.{field}"),
            "must be within [0, 1]",
        ));
    }
    Ok(())
}

fn check_color(field: &str, v: &str) -> StageResult<()> {
    if !is_hex_color(v) {
        return Err(StageError::validation_at(
            format!("$.{field}"),
            format!("'{v}' is not a #rgb/#rrggbb/#rrggbbaa color"),
        ));
    }
    Ok(())
}

fn check_intrinsic(size: Option<Size>) -> StageResult<()> {
    match size {
        Some(s) => s.validate("intrinsicSize"),
        None => Ok(()),
    }
}

fn default_font_size() -> f64 {
    48.0
}

fn default_text_color() -> String {
    "#ffffff".to_owned()
}

fn default_one() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Text payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    /// UTF-8 text content.
    pub text: String,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Font family; renderer default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Fill color.
    #[serde(default = "default_text_color")]
    pub color: String,
    /// Weight/slant/alignment.
    #[serde(default)]
    pub text_style: TextStyle,
}

impl TextProps {
    fn validate(&self) -> StageResult<()> {
        if ensure_finite("fontSize", self.font_size)? <= 0.0 {
            return Err(StageError::validation_at("$.fontSize", "must be > 0"));
        }
        check_color("color", &self.color)?;
        let style = &self.text_style;
        if !(100..=900).contains(&style.font_weight) {
            return Err(StageError::validation_at(
                "$.textStyle.fontWeight",
                "must be within [100, 900]",
            ));
        }
        if ensure_finite("textStyle.lineHeight", style.line_height)? <= 0.0 {
            return Err(StageError::validation_at(
                "$.textStyle.lineHeight",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Text styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    /// CSS-like weight, 100..=900.
    pub font_weight: u16,
    /// Italic slant.
    pub italic: bool,
    /// Underline decoration.
    pub underline: bool,
    /// Alignment within the text box.
    pub align: TextAlign,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_weight: 400,
            italic: false,
            underline: false,
            align: TextAlign::Left,
            line_height: 1.2,
        }
    }
}

/// Image payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Asset URL (not fetched by this crate).
    pub url: String,
    /// Natural size, when known; drives `keepRatio`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intrinsic_size: Option<Size>,
}

/// Video payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProps {
    /// Asset URL.
    pub url: String,
    /// Playback volume in `[0, 1]`.
    #[serde(default = "default_one")]
    pub volume: f64,
    /// Restart when the source ends.
    #[serde(default, rename = "loop")]
    pub looping: bool,
    /// Silence audio.
    #[serde(default)]
    pub muted: bool,
    /// Natural size, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intrinsic_size: Option<Size>,
}

/// Emoji payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmojiProps {
    /// The emoji glyph (may be a multi-codepoint sequence).
    pub emoji: String,
}

/// Shape primitive kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle (optionally rounded).
    #[default]
    Rectangle,
    /// Ellipse inscribed in the element box.
    Ellipse,
    /// Isosceles triangle pointing up.
    Triangle,
    /// Line from top-left to bottom-right of the box.
    Line,
}

fn default_fill() -> String {
    "#cccccc".to_owned()
}

/// Shape payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    /// Primitive kind.
    #[serde(default)]
    pub shape: ShapeKind,
    /// Fill color.
    #[serde(default = "default_fill")]
    pub fill: String,
    /// Stroke color; no stroke when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width in pixels.
    #[serde(default)]
    pub stroke_width: f64,
    /// Corner radius for rectangles.
    #[serde(default)]
    pub corner_radius: f64,
}

impl ShapeProps {
    fn validate(&self) -> StageResult<()> {
        check_color("fill", &self.fill)?;
        if let Some(stroke) = &self.stroke {
            check_color("stroke", stroke)?;
        }
        check_dimension("strokeWidth", Some(self.stroke_width))?;
        check_dimension("cornerRadius", Some(self.corner_radius))
    }
}

/// Lottie payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LottieProps {
    /// Animation JSON URL.
    pub url: String,
    /// Restart when the animation ends.
    #[serde(default = "default_true", rename = "loop")]
    pub looping: bool,
    /// Playback speed multiplier.
    #[serde(default = "default_one")]
    pub speed: f64,
    /// Natural size, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intrinsic_size: Option<Size>,
}

/// Widget entry/exit phase payload.
///
/// `params` is validated against the definition's appear/disappear schema.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPhase {
    /// Phase length in seconds.
    pub duration: f64,
    /// Easing of the phase progress.
    #[serde(default)]
    pub ease: Ease,
    /// Widget-defined phase parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl WidgetPhase {
    /// Phase with empty params and linear easing.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ease: Ease::Linear,
            params: Map::new(),
        }
    }

    fn validate(&self, field: &str) -> StageResult<()> {
        if ensure_finite(&format!("{field}.duration"), self.duration)? < 0.0 {
            return Err(StageError::validation_at(
                format!("$.{field}.duration"),
                "must be >= 0",
            ));
        }
        Ok(())
    }
}

/// Audio/media control attached to a widget.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayPayload {
    /// Media URL.
    pub url: String,
    /// Volume in `[0, 1]`.
    #[serde(default = "default_one")]
    pub volume: f64,
    /// Restart when the media ends.
    #[serde(default, rename = "loop")]
    pub looping: bool,
}

/// Widget instance payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetProps {
    /// Package namespace of the definition.
    pub scope: String,
    /// Definition name within `scope`.
    pub widget_id: String,
    /// User parameters (validated against the definition's parameter schema).
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Entry phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appear: Option<WidgetPhase>,
    /// Exit phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disappear: Option<WidgetPhase>,
    /// Attached media control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play: Option<PlayPayload>,
}

impl WidgetProps {
    /// Reference to `(scope, widget_id)` with empty parameters.
    pub fn new(scope: impl Into<String>, widget_id: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            widget_id: widget_id.into(),
            parameters: Map::new(),
            appear: None,
            disappear: None,
            play: None,
        }
    }

    fn validate(&self) -> StageResult<()> {
        if self.scope.trim().is_empty() {
            return Err(StageError::validation_at("$.scope", "must be non-empty"));
        }
        if self.widget_id.trim().is_empty() {
            return Err(StageError::validation_at("$.widgetId", "must be non-empty"));
        }
        if let Some(p) = &self.appear {
            p.validate("appear")?;
        }
        if let Some(p) = &self.disappear {
            p.validate("disappear")?;
        }
        if let Some(play) = &self.play {
            check_url("play.url", &play.url)?;
            check_unit("play.volume", play.volume)?;
        }
        Ok(())
    }
}

/// A visual node on the stage: common base plus a variant payload.
///
/// Setters validate their field and fail fast. Cross-field constraints (`keepRatio` against the
/// intrinsic aspect ratio) are checked by [`Element::validate`], which the clip runs on every
/// insert and modification.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    id: ElementId,
    name: Option<String>,
    geometry: Geometry,
    flags: PlacementFlags,
    start_time: f64,
    duration: Option<f64>,
    animations: Vec<Animation>,
    kind: ElementKind,
}

impl Element {
    /// Element with a generated id and the variant's defaults merged over the base defaults.
    pub fn new(kind: ElementKind) -> Self {
        let mut geometry = Geometry::default();
        let mut flags = PlacementFlags::default();
        match &kind {
            ElementKind::Image(_) | ElementKind::Video(_) | ElementKind::Lottie(_) => {
                flags.keep_ratio = true;
            }
            ElementKind::Emoji(_) => {
                flags.keep_ratio = true;
                geometry.width = Some(64.0);
                geometry.height = Some(64.0);
            }
            ElementKind::Shape(_) => {
                geometry.width = Some(100.0);
                geometry.height = Some(100.0);
            }
            ElementKind::Text(_) | ElementKind::Group | ElementKind::Widget(_) => {}
        }
        Self {
            id: ElementId::generate(),
            name: None,
            geometry,
            flags,
            start_time: 0.0,
            duration: None,
            animations: Vec::new(),
            kind,
        }
    }

    /// Text element.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Text(TextProps {
            text: text.into(),
            font_size: default_font_size(),
            font_family: None,
            color: default_text_color(),
            text_style: TextStyle::default(),
        }))
    }

    /// Image element.
    pub fn image(url: impl Into<String>) -> Self {
        Self::new(ElementKind::Image(ImageProps {
            url: url.into(),
            intrinsic_size: None,
        }))
    }

    /// Video element.
    pub fn video(url: impl Into<String>) -> Self {
        Self::new(ElementKind::Video(VideoProps {
            url: url.into(),
            volume: 1.0,
            looping: false,
            muted: false,
            intrinsic_size: None,
        }))
    }

    /// Emoji element (64x64 by default).
    pub fn emoji(emoji: impl Into<String>) -> Self {
        Self::new(ElementKind::Emoji(EmojiProps {
            emoji: emoji.into(),
        }))
    }

    /// Shape element (100x100 by default).
    pub fn shape(shape: ShapeKind) -> Self {
        Self::new(ElementKind::Shape(ShapeProps {
            shape,
            fill: default_fill(),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 0.0,
        }))
    }

    /// Lottie element.
    pub fn lottie(url: impl Into<String>) -> Self {
        Self::new(ElementKind::Lottie(LottieProps {
            url: url.into(),
            looping: true,
            speed: 1.0,
            intrinsic_size: None,
        }))
    }

    /// Empty group.
    pub fn group() -> Self {
        Self::new(ElementKind::Group)
    }

    /// Widget instance referencing `(scope, widget_id)`; parameters start empty.
    ///
    /// Prefer [`crate::WidgetRegistry::instantiate`], which applies definition defaults and
    /// validates parameters up front.
    pub fn widget(scope: impl Into<String>, widget_id: impl Into<String>) -> Self {
        Self::new(ElementKind::Widget(WidgetProps::new(scope, widget_id)))
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<ElementId>) -> StageResult<Self> {
        let id = id.into();
        if id.as_str().trim().is_empty() {
            return Err(StageError::validation_at("$.id", "must be non-empty"));
        }
        self.id = id;
        Ok(self)
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set `(x, y)`.
    pub fn at(mut self, x: f64, y: f64) -> StageResult<Self> {
        self.set_position(x, y)?;
        Ok(self)
    }

    /// Set both dimensions.
    pub fn sized(mut self, width: f64, height: f64) -> StageResult<Self> {
        self.set_size(Some(width), Some(height))?;
        Ok(self)
    }

    /// Replace all placement flags.
    pub fn with_flags(mut self, flags: PlacementFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the local timeline offset and optional duration.
    pub fn timed(mut self, start_time: f64, duration: Option<f64>) -> StageResult<Self> {
        self.set_start_time(start_time)?;
        self.set_duration(duration)?;
        Ok(self)
    }

    /// Append an animation (see [`Element::add_animation`]).
    pub fn with_animation(mut self, animation: Animation) -> StageResult<Self> {
        self.add_animation(animation)?;
        Ok(self)
    }

    /// Element id.
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set or clear the display name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Static geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Replace the whole static geometry.
    pub fn set_geometry(&mut self, geometry: Geometry) -> StageResult<()> {
        geometry.validate()?;
        self.geometry = geometry;
        Ok(())
    }

    /// Set `x`.
    pub fn set_x(&mut self, x: f64) -> StageResult<()> {
        self.geometry.x = ensure_finite("x", x)?;
        Ok(())
    }

    /// Set `y`.
    pub fn set_y(&mut self, y: f64) -> StageResult<()> {
        self.geometry.y = ensure_finite("y", y)?;
        Ok(())
    }

    /// Set `(x, y)` atomically.
    pub fn set_position(&mut self, x: f64, y: f64) -> StageResult<()> {
        ensure_finite("x", x)?;
        ensure_finite("y", y)?;
        self.geometry.x = x;
        self.geometry.y = y;
        Ok(())
    }

    /// Set or clear the width.
    pub fn set_width(&mut self, width: Option<f64>) -> StageResult<()> {
        check_dimension("width", width)?;
        self.geometry.width = width;
        Ok(())
    }

    /// Set or clear the height.
    pub fn set_height(&mut self, height: Option<f64>) -> StageResult<()> {
        check_dimension("height", height)?;
        self.geometry.height = height;
        Ok(())
    }

    /// Set both dimensions; also checks `keepRatio` against the intrinsic ratio.
    pub fn set_size(&mut self, width: Option<f64>, height: Option<f64>) -> StageResult<()> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        resolve_size(width, height, self.flags.keep_ratio, self.kind.intrinsic_ratio())?;
        self.geometry.width = width;
        self.geometry.height = height;
        Ok(())
    }

    /// Set rotation in degrees.
    pub fn set_rotation(&mut self, degrees: f64) -> StageResult<()> {
        self.geometry.rotation = ensure_finite("rotation", degrees)?;
        Ok(())
    }

    /// Set the uniform scale (finite, >= 0).
    pub fn set_scale(&mut self, scale: f64) -> StageResult<()> {
        if ensure_finite("scale", scale)? < 0.0 {
            return Err(StageError::validation_at("$.scale", "must be >= 0"));
        }
        self.geometry.scale = scale;
        Ok(())
    }

    /// Set opacity in `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) -> StageResult<()> {
        check_opacity(opacity)?;
        self.geometry.opacity = opacity;
        Ok(())
    }

    /// Placement flags.
    pub fn flags(&self) -> PlacementFlags {
        self.flags
    }

    /// Toggle `keepRatio`.
    pub fn set_keep_ratio(&mut self, keep_ratio: bool) {
        self.flags.keep_ratio = keep_ratio;
    }

    /// Toggle `originCenter`.
    pub fn set_origin_center(&mut self, origin_center: bool) {
        self.flags.origin_center = origin_center;
    }

    /// Toggle `anchorToCenter`.
    pub fn set_anchor_to_center(&mut self, anchor_to_center: bool) {
        self.flags.anchor_to_center = anchor_to_center;
    }

    /// Offset of the local timeline within the owner's timeline.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Set the local timeline offset (finite, >= 0).
    pub fn set_start_time(&mut self, start_time: f64) -> StageResult<()> {
        if ensure_finite("startTime", start_time)? < 0.0 {
            return Err(StageError::validation_at("$.startTime", "must be >= 0"));
        }
        self.start_time = start_time;
        Ok(())
    }

    /// Active window length; `None` lasts until the owner's window ends.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Set or clear the active window length (finite, > 0).
    pub fn set_duration(&mut self, duration: Option<f64>) -> StageResult<()> {
        if let Some(d) = duration
            && ensure_finite("duration", d)? <= 0.0
        {
            return Err(StageError::validation_at("$.duration", "must be > 0"));
        }
        self.duration = duration;
        Ok(())
    }

    /// Variant payload.
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Mutable variant payload. Unchecked; validated when the element enters or is modified
    /// through a clip.
    pub fn kind_mut(&mut self) -> &mut ElementKind {
        &mut self.kind
    }

    /// Variant tag.
    pub fn variant(&self) -> ElementVariant {
        self.kind.variant()
    }

    /// Whether this element can own children.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group)
    }

    /// Widget payload, if this is a widget.
    pub fn widget_props(&self) -> Option<&WidgetProps> {
        match &self.kind {
            ElementKind::Widget(w) => Some(w),
            _ => None,
        }
    }

    /// Attached animations in evaluation order.
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Append an animation.
    ///
    /// The range is checked before anything is appended: `end < start` fails with
    /// [`StageError::InvalidRange`]; appending an instance that is already attached fails with
    /// [`StageError::DuplicateAnimation`].
    pub fn add_animation(&mut self, animation: Animation) -> StageResult<()> {
        animation.validate()?;
        if self.animations.iter().any(|a| a.id == animation.id) {
            return Err(StageError::DuplicateAnimation {
                element_id: self.id.to_string(),
                animation_id: animation.id.to_string(),
            });
        }
        tracing::debug!(
            element = %self.id,
            kind = animation.kind.type_name(),
            start = animation.start_time,
            end = animation.end_time,
            "animation attached"
        );
        self.animations.push(animation);
        Ok(())
    }

    /// Detach an animation by instance id.
    pub fn remove_animation(&mut self, id: &AnimationId) -> Option<Animation> {
        let pos = self.animations.iter().position(|a| &a.id == id)?;
        Some(self.animations.remove(pos))
    }

    /// Effective `(width, height)` after `keepRatio` derivation.
    pub fn resolved_size(&self) -> StageResult<(Option<f64>, Option<f64>)> {
        resolve_size(
            self.geometry.width,
            self.geometry.height,
            self.flags.keep_ratio,
            self.kind.intrinsic_ratio(),
        )
        .map_err(|e| match e {
            StageError::Validation { message, .. } => {
                StageError::validation(format!("element '{}': {message}", self.id))
            }
            other => other,
        })
    }

    /// Full validation of base fields, payload and animations.
    pub fn validate(&self) -> StageResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(StageError::validation_at("$.id", "must be non-empty"));
        }
        self.geometry.validate()?;
        ensure_finite("startTime", self.start_time)?;
        if self.start_time < 0.0 {
            return Err(StageError::validation_at("$.startTime", "must be >= 0"));
        }
        if let Some(d) = self.duration
            && ensure_finite("duration", d)? <= 0.0
        {
            return Err(StageError::validation_at("$.duration", "must be > 0"));
        }
        self.kind.validate()?;
        self.resolved_size()?;
        for a in &self.animations {
            a.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/model.rs"]
mod tests;
