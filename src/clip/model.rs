use crate::{
    element::model::Element,
    element::tree::ElementTree,
    foundation::core::Canvas,
    foundation::error::{StageError, StageResult, ensure_finite},
    foundation::ids::ElementId,
};

/// Top-level container: a stage, a time segment and the element tree placed on it.
///
/// All mutation goes through `&mut Clip`, and every method that changes an element validates it
/// before committing; a failed call leaves the clip unchanged.
#[derive(Clone, Debug)]
pub struct Clip {
    id: String,
    canvas: Canvas,
    duration: f64,
    tree: ElementTree,
}

impl Clip {
    /// Empty clip with a generated id.
    pub fn new(canvas: Canvas, duration: f64) -> StageResult<Self> {
        check_duration(duration)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            canvas,
            duration,
            tree: ElementTree::new(),
        })
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> StageResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(StageError::validation_at("$.id", "must be non-empty"));
        }
        self.id = id;
        Ok(self)
    }

    /// Clip id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stage size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Resize the stage.
    pub fn set_canvas(&mut self, canvas: Canvas) -> StageResult<()> {
        self.canvas = Canvas::new(canvas.width, canvas.height)?;
        Ok(())
    }

    /// Length of the clip in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Change the clip length (finite, > 0).
    pub fn set_duration(&mut self, duration: f64) -> StageResult<()> {
        check_duration(duration)?;
        self.duration = duration;
        Ok(())
    }

    /// Read-only view of the element tree.
    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub(crate) fn replace_tree(&mut self, tree: ElementTree) {
        self.tree = tree;
    }

    /// Look up an element anywhere in the clip.
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.tree.get(id)
    }

    /// Append a top-level element; returns its id.
    pub fn add(&mut self, element: Element) -> StageResult<ElementId> {
        let id = element.id().clone();
        self.tree.insert(None, element)?;
        Ok(id)
    }

    /// Append an element as the last child of `group`; returns its id.
    pub fn add_to(&mut self, group: &ElementId, element: Element) -> StageResult<ElementId> {
        let id = element.id().clone();
        self.tree.insert(Some(group), element)?;
        Ok(id)
    }

    /// Mutate an element through `f`; see [`ElementTree::modify`].
    pub fn modify<R>(
        &mut self,
        id: &ElementId,
        f: impl FnOnce(&mut Element) -> R,
    ) -> StageResult<R> {
        self.tree.modify(id, f)
    }

    /// Fallible variant of [`Clip::modify`]; see [`ElementTree::try_modify`].
    pub fn try_modify<R>(
        &mut self,
        id: &ElementId,
        f: impl FnOnce(&mut Element) -> StageResult<R>,
    ) -> StageResult<R> {
        self.tree.try_modify(id, f)
    }

    /// Replace a group's ordered children; see [`ElementTree::set_children`].
    pub fn set_children(&mut self, group: &ElementId, children: &[ElementId]) -> StageResult<()> {
        self.tree.set_children(group, children)
    }

    /// Place a detached element at the top level (`None`) or inside a group.
    pub fn attach(&mut self, parent: Option<&ElementId>, id: &ElementId) -> StageResult<()> {
        self.tree.attach(parent, id)
    }

    /// Unplace an element, keeping it in the clip.
    pub fn detach(&mut self, id: &ElementId) -> StageResult<()> {
        self.tree.detach(id)
    }

    /// Move an element within its owner's paint order.
    pub fn reorder(&mut self, id: &ElementId, index: usize) -> StageResult<()> {
        self.tree.reorder(id, index)
    }

    /// Destroy an element and its subtree.
    pub fn remove(&mut self, id: &ElementId) -> StageResult<Element> {
        self.tree.remove(id)
    }
}

fn check_duration(duration: f64) -> StageResult<()> {
    if ensure_finite("duration", duration)? <= 0.0 {
        return Err(StageError::validation_at("$.duration", "must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/clip/model.rs"]
mod tests;
