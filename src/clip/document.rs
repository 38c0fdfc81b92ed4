//! Persisted JSON form of a clip.
//!
//! Elements serialize as flat camelCase objects tagged by `type`; groups nest their children.
//! Loading validates every element exactly as the authoring API does, and reports errors with the
//! element's document path (`$.elements[1].children[0].opacity`).

use serde_json::{Map, Value};

use crate::{
    animation::ease::Ease,
    animation::kind::Animation,
    clip::model::Clip,
    element::model::{
        Element, ElementKind, EmojiProps, ImageProps, LottieProps, ShapeProps, TextProps,
        VideoProps, WidgetProps,
    },
    element::tree::ElementTree,
    foundation::core::Canvas,
    foundation::error::{StageError, StageResult},
    foundation::ids::{AnimationId, ElementId, NodeIdx},
    transform::placement::Geometry,
};

/// Root document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipDocument {
    /// Clip id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Stage width in pixels.
    pub width: u32,
    /// Stage height in pixels.
    pub height: u32,
    /// Clip length in seconds.
    pub duration: f64,
    /// Top-level elements in paint order.
    #[serde(default)]
    pub elements: Vec<ElementDocument>,
    /// Elements held by the clip but not placed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detached: Vec<ElementDocument>,
}

/// One element, its animations and (for groups) its children.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDocument {
    /// Element id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElementId>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Static geometry.
    #[serde(flatten)]
    pub geometry: Geometry,
    /// `keepRatio`; variant default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_ratio: Option<bool>,
    /// `originCenter`; variant default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_center: Option<bool>,
    /// `anchorToCenter`; variant default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_to_center: Option<bool>,
    /// Local timeline offset.
    #[serde(default)]
    pub start_time: f64,
    /// Active window length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Animations in evaluation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<AnimationDocument>,
    /// Variant tag and payload.
    #[serde(flatten)]
    pub content: ContentDocument,
}

/// Variant payload keyed by `type`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentDocument {
    /// Text.
    Text(TextProps),
    /// Image.
    Image(ImageProps),
    /// Video.
    Video(VideoProps),
    /// Emoji.
    Emoji(EmojiProps),
    /// Shape.
    Shape(ShapeProps),
    /// Lottie.
    Lottie(LottieProps),
    /// Group with nested children.
    Group {
        /// Children in paint order.
        #[serde(default)]
        children: Vec<ElementDocument>,
    },
    /// Widget.
    Widget(WidgetProps),
}

/// One animation: `type`, range, optional ease and flat type-specific parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDocument {
    /// Instance id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AnimationId>,
    /// Animation type (`FadeIn`, `SlideIn`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Range start (element-local seconds).
    pub start_time: f64,
    /// Range end (element-local seconds).
    pub end_time: f64,
    /// Easing override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease: Option<Ease>,
    /// Type-specific parameters.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl AnimationDocument {
    fn from_animation(a: &Animation) -> Self {
        Self {
            id: Some(a.id.clone()),
            kind: a.kind.type_name().to_owned(),
            start_time: a.start_time,
            end_time: a.end_time,
            ease: a.ease,
            params: a.kind.params(),
        }
    }

    fn to_animation(&self) -> StageResult<Animation> {
        let mut a = Animation::parse(
            &self.kind,
            self.start_time,
            self.end_time,
            &Value::Object(self.params.clone()),
        )?;
        if let Some(id) = &self.id {
            a.id = id.clone();
        }
        a.ease = self.ease;
        Ok(a)
    }
}

impl ElementDocument {
    fn from_node(tree: &ElementTree, idx: NodeIdx) -> Self {
        let node = tree.node(idx);
        let el = &node.element;
        let flags = el.flags();
        let content = match el.kind() {
            ElementKind::Text(p) => ContentDocument::Text(p.clone()),
            ElementKind::Image(p) => ContentDocument::Image(p.clone()),
            ElementKind::Video(p) => ContentDocument::Video(p.clone()),
            ElementKind::Emoji(p) => ContentDocument::Emoji(p.clone()),
            ElementKind::Shape(p) => ContentDocument::Shape(p.clone()),
            ElementKind::Lottie(p) => ContentDocument::Lottie(p.clone()),
            ElementKind::Widget(p) => ContentDocument::Widget(p.clone()),
            ElementKind::Group => ContentDocument::Group {
                children: node
                    .children
                    .iter()
                    .map(|&c| Self::from_node(tree, c))
                    .collect(),
            },
        };
        Self {
            id: Some(el.id().clone()),
            name: el.name().map(str::to_owned),
            geometry: *el.geometry(),
            keep_ratio: Some(flags.keep_ratio),
            origin_center: Some(flags.origin_center),
            anchor_to_center: Some(flags.anchor_to_center),
            start_time: el.start_time(),
            duration: el.duration(),
            animations: el
                .animations()
                .iter()
                .map(AnimationDocument::from_animation)
                .collect(),
            content,
        }
    }

    /// Build the element (without children) and return the child documents separately.
    fn to_element(&self) -> StageResult<(Element, &[ElementDocument])> {
        let (kind, children) = match &self.content {
            ContentDocument::Text(p) => (ElementKind::Text(p.clone()), &[][..]),
            ContentDocument::Image(p) => (ElementKind::Image(p.clone()), &[][..]),
            ContentDocument::Video(p) => (ElementKind::Video(p.clone()), &[][..]),
            ContentDocument::Emoji(p) => (ElementKind::Emoji(p.clone()), &[][..]),
            ContentDocument::Shape(p) => (ElementKind::Shape(p.clone()), &[][..]),
            ContentDocument::Lottie(p) => (ElementKind::Lottie(p.clone()), &[][..]),
            ContentDocument::Widget(p) => (ElementKind::Widget(p.clone()), &[][..]),
            ContentDocument::Group { children } => (ElementKind::Group, children.as_slice()),
        };

        let mut el = Element::new(kind);
        if let Some(id) = &self.id {
            el = el.with_id(id.clone())?;
        }
        el.set_name(self.name.clone());

        el.set_geometry(self.geometry)?;

        let mut flags = el.flags();
        if let Some(v) = self.keep_ratio {
            flags.keep_ratio = v;
        }
        if let Some(v) = self.origin_center {
            flags.origin_center = v;
        }
        if let Some(v) = self.anchor_to_center {
            flags.anchor_to_center = v;
        }
        el = el.with_flags(flags);

        el.set_start_time(self.start_time)?;
        el.set_duration(self.duration)?;
        for (i, a) in self.animations.iter().enumerate() {
            let anim = a
                .to_animation()
                .map_err(|e| rebase(e, &format!("$.animations[{i}]")))?;
            el.add_animation(anim)?;
        }
        Ok((el, children))
    }
}

/// Prefix a validation path rooted at `$` with `prefix`.
fn rebase(err: StageError, prefix: &str) -> StageError {
    match err {
        StageError::Validation { path, message } => {
            let rest = path.strip_prefix('$').unwrap_or(&path);
            StageError::Validation {
                path: format!("{prefix}{rest}"),
                message,
            }
        }
        other => other,
    }
}

/// Recurses once per group level, at most `ElementTree::MAX_DEPTH` deep.
fn load_element(
    tree: &mut ElementTree,
    parent: Option<&ElementId>,
    doc: &ElementDocument,
    path: &str,
) -> StageResult<ElementId> {
    let (el, children) = doc.to_element().map_err(|e| rebase(e, path))?;
    let id = el.id().clone();
    tree.insert(parent, el).map_err(|e| rebase(e, path))?;
    for (i, child) in children.iter().enumerate() {
        load_element(tree, Some(&id), child, &format!("{path}.children[{i}]"))?;
    }
    Ok(id)
}

impl ClipDocument {
    /// Snapshot a clip.
    pub fn from_clip(clip: &Clip) -> Self {
        let tree = clip.tree();
        let canvas = clip.canvas();
        Self {
            id: Some(clip.id().to_owned()),
            width: canvas.width,
            height: canvas.height,
            duration: clip.duration(),
            elements: tree
                .root_indices()
                .iter()
                .map(|&i| ElementDocument::from_node(tree, i))
                .collect(),
            detached: tree
                .detached_indices()
                .into_iter()
                .map(|i| ElementDocument::from_node(tree, i))
                .collect(),
        }
    }

    /// Build and validate a clip.
    pub fn into_clip(self) -> StageResult<Clip> {
        let canvas = Canvas::new(self.width, self.height)?;
        let mut clip = Clip::new(canvas, self.duration)?;
        if let Some(id) = self.id {
            clip = clip.with_id(id)?;
        }

        let mut tree = ElementTree::new();
        for (i, doc) in self.elements.iter().enumerate() {
            load_element(&mut tree, None, doc, &format!("$.elements[{i}]"))?;
        }
        for (i, doc) in self.detached.iter().enumerate() {
            let id = load_element(&mut tree, None, doc, &format!("$.detached[{i}]"))?;
            tree.detach(&id)?;
        }
        clip.replace_tree(tree);
        Ok(clip)
    }
}

impl Clip {
    /// Snapshot as a [`ClipDocument`].
    pub fn to_document(&self) -> ClipDocument {
        ClipDocument::from_clip(self)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> StageResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Parse and validate a clip from JSON.
    pub fn from_json(json: &str) -> StageResult<Self> {
        let doc: ClipDocument = serde_json::from_str(json)?;
        doc.into_clip()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clip/document.rs"]
mod tests;
