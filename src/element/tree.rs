//! Arena-backed element tree.
//!
//! Elements live in slots addressed by [`NodeIdx`]; each node records its single owner and, for
//! groups, the ordered list of child indices. Owning references never point upwards, so the tree
//! is cycle-free by construction and attach checks only have to walk the owner chain.
//!
//! Nesting is capped at [`ElementTree::MAX_DEPTH`] levels, which keeps every tree that can be
//! built within what the JSON document loader and the recursive resolver accept.

use std::collections::{HashMap, HashSet};

use crate::{
    element::model::Element,
    foundation::error::{StageError, StageResult},
    foundation::ids::{ElementId, NodeIdx},
};

/// Who currently owns an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Owner {
    /// Top level of the clip.
    Root,
    /// Child of a group.
    Group(NodeIdx),
    /// Held by the clip but not placed; not rendered.
    Detached,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) element: Element,
    pub(crate) owner: Owner,
    pub(crate) children: Vec<NodeIdx>,
}

/// Ordered, nestable scene graph of one clip.
///
/// Invariants: ids are unique across all held elements (attached or detached); every element
/// has at most one owner; only groups have children.
#[derive(Clone, Debug, Default)]
pub struct ElementTree {
    slots: Vec<Option<Node>>,
    free: Vec<NodeIdx>,
    by_id: HashMap<ElementId, NodeIdx>,
    roots: Vec<NodeIdx>,
}

impl ElementTree {
    /// Deepest level an element may sit at; top-level elements are at level 1.
    pub const MAX_DEPTH: usize = 32;

    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of held elements, including detached ones.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the tree holds no elements.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Whether an element with `id` is held.
    pub fn contains(&self, id: &ElementId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Look up an element.
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.by_id.get(id).map(|&idx| &self.node(idx).element)
    }

    /// Look up an element, failing with [`StageError::NotFound`].
    pub fn element(&self, id: &ElementId) -> StageResult<&Element> {
        self.get(id).ok_or_else(|| StageError::not_found(id.as_str()))
    }

    /// Top-level elements in paint order.
    pub fn roots(&self) -> impl Iterator<Item = &Element> {
        self.roots.iter().map(|&idx| &self.node(idx).element)
    }

    /// Ordered children of a group.
    pub fn children(&self, id: &ElementId) -> StageResult<Vec<&ElementId>> {
        let idx = self.idx(id)?;
        Ok(self
            .node(idx)
            .children
            .iter()
            .map(|&c| self.node(c).element.id())
            .collect())
    }

    /// Owning group of an element; `None` for top-level and detached elements.
    pub fn parent(&self, id: &ElementId) -> StageResult<Option<&ElementId>> {
        let idx = self.idx(id)?;
        Ok(match self.node(idx).owner {
            Owner::Group(p) => Some(self.node(p).element.id()),
            Owner::Root | Owner::Detached => None,
        })
    }

    /// Whether the element is placed in the tree (top level or inside a placed group chain).
    pub fn is_attached(&self, id: &ElementId) -> StageResult<bool> {
        let mut idx = self.idx(id)?;
        loop {
            match self.node(idx).owner {
                Owner::Root => return Ok(true),
                Owner::Detached => return Ok(false),
                Owner::Group(p) => idx = p,
            }
        }
    }

    /// Ids of elements held but not placed.
    pub fn detached(&self) -> Vec<&ElementId> {
        self.live_nodes()
            .filter(|n| n.owner == Owner::Detached)
            .map(|n| n.element.id())
            .collect()
    }

    /// Depth-first, pre-order walk over placed elements with their depth.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: self.roots.iter().rev().map(|&i| (i, 0)).collect(),
        }
    }

    /// Insert a new element at the top level (`parent = None`) or as the last child of a group.
    pub fn insert(&mut self, parent: Option<&ElementId>, element: Element) -> StageResult<()> {
        element.validate()?;
        if self.by_id.contains_key(element.id()) {
            return Err(StageError::validation_at(
                "$.id",
                format!("duplicate element id '{}'", element.id()),
            ));
        }
        let owner = match parent {
            None => Owner::Root,
            Some(pid) => Owner::Group(self.group_idx(pid)?),
        };
        if let Owner::Group(g) = owner {
            self.check_depth(g, 1, element.id())?;
        }

        let id = element.id().clone();
        let node = Node {
            element,
            owner,
            children: Vec::new(),
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx.slot()] = Some(node);
                idx
            }
            None => {
                let raw = u32::try_from(self.slots.len())
                    .map_err(|_| StageError::validation("element tree is full"))?;
                self.slots.push(Some(node));
                NodeIdx(raw)
            }
        };
        self.by_id.insert(id.clone(), idx);
        self.owner_list_mut(owner).push(idx);
        tracing::debug!(element = %id, parent = ?parent.map(ElementId::as_str), "element inserted");
        Ok(())
    }

    /// Apply `f` to an element and re-validate; on failure the element is left unchanged.
    pub fn modify<R>(
        &mut self,
        id: &ElementId,
        f: impl FnOnce(&mut Element) -> R,
    ) -> StageResult<R> {
        let idx = self.idx(id)?;
        let node = self.node(idx);
        let mut draft = node.element.clone();
        let had_children = !node.children.is_empty();

        let out = f(&mut draft);
        draft.validate()?;
        if draft.id() != id {
            return Err(StageError::validation_at("$.id", "id cannot change"));
        }
        if had_children && !draft.is_group() {
            return Err(StageError::validation(format!(
                "element '{id}' has children and must stay a group"
            )));
        }
        self.node_mut(idx).element = draft;
        Ok(out)
    }

    /// Like [`ElementTree::modify`] for fallible edits: an `Err` from `f` also discards the edit.
    pub fn try_modify<R>(
        &mut self,
        id: &ElementId,
        f: impl FnOnce(&mut Element) -> StageResult<R>,
    ) -> StageResult<R> {
        let idx = self.idx(id)?;
        let mut draft = self.node(idx).element.clone();
        let out = f(&mut draft)?;
        self.modify(id, move |e| *e = draft)?;
        Ok(out)
    }

    /// Replace the full ordered child list of a group.
    ///
    /// Every listed element must be detached or already a child of this group; anything else is
    /// an [`StageError::Ownership`] error, as is listing the group itself or one of its
    /// ancestors. Previous children that are not listed are destroyed with their subtrees.
    pub fn set_children(&mut self, group: &ElementId, ids: &[ElementId]) -> StageResult<()> {
        let gidx = self.group_idx(group)?;

        let mut seen = HashSet::new();
        let mut new_children = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id) {
                return Err(StageError::ownership(format!(
                    "element '{id}' listed twice in children of '{group}'"
                )));
            }
            let idx = self.idx(id)?;
            match self.node(idx).owner {
                Owner::Detached => {}
                Owner::Group(p) if p == gidx => {}
                Owner::Root => {
                    return Err(StageError::ownership(format!(
                        "element '{id}' is owned by the clip; detach it first"
                    )));
                }
                Owner::Group(p) => {
                    return Err(StageError::ownership(format!(
                        "element '{id}' is owned by group '{}'; detach it first",
                        self.node(p).element.id()
                    )));
                }
            }
            if self.is_self_or_ancestor(idx, gidx) {
                return Err(StageError::ownership(format!(
                    "element '{id}' cannot become a child of its own descendant '{group}'"
                )));
            }
            self.check_depth(gidx, self.height(idx), id)?;
            new_children.push(idx);
        }

        let dropped: Vec<NodeIdx> = self
            .node(gidx)
            .children
            .iter()
            .copied()
            .filter(|c| !new_children.contains(c))
            .collect();
        for idx in dropped {
            self.destroy_subtree(idx);
        }
        for &c in &new_children {
            self.node_mut(c).owner = Owner::Group(gidx);
        }
        self.node_mut(gidx).children = new_children;
        tracing::debug!(group = %group, count = ids.len(), "group children replaced");
        Ok(())
    }

    /// Place a detached element at the end of the top level or of a group.
    pub fn attach(&mut self, parent: Option<&ElementId>, id: &ElementId) -> StageResult<()> {
        let idx = self.idx(id)?;
        if self.node(idx).owner != Owner::Detached {
            return Err(StageError::ownership(format!(
                "element '{id}' already has an owner; detach it first"
            )));
        }
        let owner = match parent {
            None => Owner::Root,
            Some(pid) => {
                let gidx = self.group_idx(pid)?;
                if self.is_self_or_ancestor(idx, gidx) {
                    return Err(StageError::ownership(format!(
                        "element '{id}' cannot be attached inside its own subtree"
                    )));
                }
                self.check_depth(gidx, self.height(idx), id)?;
                Owner::Group(gidx)
            }
        };
        self.node_mut(idx).owner = owner;
        self.owner_list_mut(owner).push(idx);
        Ok(())
    }

    /// Remove an element from its owner but keep it (and its subtree) in the clip.
    pub fn detach(&mut self, id: &ElementId) -> StageResult<()> {
        let idx = self.idx(id)?;
        let owner = self.node(idx).owner;
        if owner == Owner::Detached {
            return Ok(());
        }
        self.owner_list_mut(owner).retain(|&c| c != idx);
        self.node_mut(idx).owner = Owner::Detached;
        Ok(())
    }

    /// Move an element to `index` within its owner's list (clamped to the end).
    pub fn reorder(&mut self, id: &ElementId, index: usize) -> StageResult<()> {
        let idx = self.idx(id)?;
        let owner = self.node(idx).owner;
        if owner == Owner::Detached {
            return Err(StageError::ownership(format!(
                "element '{id}' is detached and has no position"
            )));
        }
        let list = self.owner_list_mut(owner);
        list.retain(|&c| c != idx);
        let index = index.min(list.len());
        list.insert(index, idx);
        Ok(())
    }

    /// Destroy an element and its subtree, returning the element itself.
    pub fn remove(&mut self, id: &ElementId) -> StageResult<Element> {
        self.detach(id)?;
        let idx = self.idx(id)?;
        let element = self.node(idx).element.clone();
        self.destroy_subtree(idx);
        tracing::debug!(element = %id, "element removed");
        Ok(element)
    }

    pub(crate) fn root_indices(&self) -> &[NodeIdx] {
        &self.roots
    }

    /// Detached subtree roots in slot order.
    pub(crate) fn detached_indices(&self) -> Vec<NodeIdx> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(n) if n.owner == Owner::Detached => Some(NodeIdx(i as u32)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn node(&self, idx: NodeIdx) -> &Node {
        self.slots[idx.slot()]
            .as_ref()
            .unwrap_or_else(|| unreachable!("dangling node index {idx:?}"))
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node {
        self.slots[idx.slot()]
            .as_mut()
            .unwrap_or_else(|| unreachable!("dangling node index {idx:?}"))
    }

    fn live_nodes(&self) -> impl Iterator<Item = &Node> {
        self.slots.iter().flatten()
    }

    fn idx(&self, id: &ElementId) -> StageResult<NodeIdx> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| StageError::not_found(id.as_str()))
    }

    fn group_idx(&self, id: &ElementId) -> StageResult<NodeIdx> {
        let idx = self.idx(id)?;
        if !self.node(idx).element.is_group() {
            return Err(StageError::validation(format!(
                "element '{id}' is not a group"
            )));
        }
        Ok(idx)
    }

    fn owner_list_mut(&mut self, owner: Owner) -> &mut Vec<NodeIdx> {
        match owner {
            Owner::Root => &mut self.roots,
            Owner::Group(g) => &mut self.node_mut(g).children,
            Owner::Detached => unreachable!("detached elements have no owner list"),
        }
    }

    /// Whether `candidate` is `node` itself or one of its ancestors.
    fn is_self_or_ancestor(&self, candidate: NodeIdx, node: NodeIdx) -> bool {
        let mut cur = node;
        loop {
            if cur == candidate {
                return true;
            }
            match self.node(cur).owner {
                Owner::Group(p) => cur = p,
                Owner::Root | Owner::Detached => return false,
            }
        }
    }

    /// Level of `idx` counted from its outermost owner (1 for an unowned element).
    fn level(&self, idx: NodeIdx) -> usize {
        let mut level = 1;
        let mut cur = idx;
        while let Owner::Group(p) = self.node(cur).owner {
            level += 1;
            cur = p;
        }
        level
    }

    /// Number of levels in the subtree rooted at `idx` (1 for a leaf).
    fn height(&self, idx: NodeIdx) -> usize {
        let mut max = 0;
        let mut stack = vec![(idx, 1)];
        while let Some((cur, h)) = stack.pop() {
            max = max.max(h);
            stack.extend(self.node(cur).children.iter().map(|&c| (c, h + 1)));
        }
        max
    }

    /// Fail if a subtree of `height` levels placed under `group` would nest too deep.
    fn check_depth(&self, group: NodeIdx, height: usize, id: &ElementId) -> StageResult<()> {
        let deepest = self.level(group) + height;
        if deepest > Self::MAX_DEPTH {
            return Err(StageError::validation(format!(
                "placing '{id}' would nest {deepest} levels deep, more than {}",
                Self::MAX_DEPTH
            )));
        }
        Ok(())
    }

    fn destroy_subtree(&mut self, idx: NodeIdx) {
        let mut stack = vec![idx];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.slots[cur.slot()].take() else {
                continue;
            };
            self.by_id.remove(node.element.id());
            stack.extend(node.children);
            self.free.push(cur);
        }
    }
}

/// Iterator returned by [`ElementTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a ElementTree,
    stack: Vec<(NodeIdx, usize)>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (&'a Element, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, depth) = self.stack.pop()?;
        let node = self.tree.node(idx);
        self.stack
            .extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        Some((&node.element, depth))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/tree.rs"]
mod tests;
