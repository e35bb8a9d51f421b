//! Tree operations: insert, remove, reparent, attributes, walk.
//!
//! Every mutation that can affect styling records a [`DomEvent`] in a pending
//! queue; [`Dom::drain_events`] hands them to whoever keeps derived state (the
//! style engine) in sync.

use std::collections::VecDeque;
use std::mem;

use slotmap::{SecondaryMap, SlotMap};

use super::event::{DomEvent, InteractionKind};
use super::node::{NodeData, NodeId};
use super::traits::DomTree;

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// Errors from structural or attribute mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("cannot attach {node:?} under itself or its descendant {parent:?}")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("child index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// The document tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
#[derive(Debug)]
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
    /// Events recorded since the last drain, in order of occurrence.
    pending: Vec<DomEvent>,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
            pending: Vec::new(),
        }
    }

    /// Insert a parentless node.
    ///
    /// If no root has been set yet, this node becomes the root and an
    /// `AppendChild` event with no parent is recorded. Otherwise the node stays
    /// detached until attached with [`Dom::append_child`].
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.create(data);
        if self.root.is_none() {
            self.root = Some(id);
            self.pending.push(DomEvent::AppendChild {
                parent: None,
                node: id,
                index: 0,
            });
        }
        id
    }

    /// Create a detached node. No event is recorded until it is attached.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Create a node and append it to `parent`.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId, DomError> {
        self.element(parent)?;
        let id = self.create(data);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Attach a detached node (with its subtree) as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let len = self.children(parent).len();
        self.insert_at(parent, len, child)
    }

    /// Attach a detached node as child number `index` of `parent`.
    pub fn insert_at(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), DomError> {
        self.element(parent)?;
        if !self.nodes.contains_key(child) {
            return Err(DomError::UnknownNode(child));
        }
        if self.parent.contains_key(child) || self.root == Some(child) {
            return Err(DomError::AlreadyAttached(child));
        }
        if parent == child || self.ancestors(parent).contains(&child) {
            return Err(DomError::Cycle {
                node: child,
                parent,
            });
        }

        let siblings = self
            .children
            .get_mut(parent)
            .ok_or(DomError::UnknownNode(parent))?;
        if index > siblings.len() {
            return Err(DomError::IndexOutOfBounds {
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, child);
        self.parent.insert(child, parent);
        self.pending.push(DomEvent::AppendChild {
            parent: Some(parent),
            node: child,
            index,
        });
        Ok(())
    }

    /// Detach `node` from its parent, keeping it and its subtree alive.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        if !self.nodes.contains_key(node) {
            return Err(DomError::UnknownNode(node));
        }
        let parent = self.unlink(node);
        if parent.is_some() || self.root == Some(node) {
            if self.root == Some(node) {
                self.root = None;
            }
            self.pending.push(DomEvent::RemoveChild { parent, node });
        }
        Ok(())
    }

    /// Move `node` to become the last child of `new_parent`.
    ///
    /// Recorded as a removal followed by an append.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), DomError> {
        self.element(new_parent)?;
        if node == new_parent || self.ancestors(new_parent).contains(&node) {
            return Err(DomError::Cycle {
                node,
                parent: new_parent,
            });
        }
        self.detach(node)?;
        self.append_child(new_parent, node)
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        let parent = self.unlink(id);
        let was_attached = parent.is_some() || self.root == Some(id);
        if self.root == Some(id) {
            self.root = None;
        }
        if was_attached {
            self.pending.push(DomEvent::RemoveChild { parent, node: id });
        }

        // Collect all descendants (BFS) to remove them.
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    // -----------------------------------------------------------------------
    // Attributes and interaction state
    // -----------------------------------------------------------------------

    /// Set an attribute, returning the previous value.
    ///
    /// Records `AttributeModified` only when the value actually changes.
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        key: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, DomError> {
        let value = value.into();
        let data = self.element_mut(element)?;
        let old = data.attributes.insert(key.to_owned(), value.clone());
        if old.as_deref() != Some(value.as_str()) {
            self.pending.push(DomEvent::AttributeModified {
                element,
                key: key.to_owned(),
                old: old.clone(),
                new: Some(value),
            });
        }
        Ok(old)
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(
        &mut self,
        element: NodeId,
        key: &str,
    ) -> Result<Option<String>, DomError> {
        let old = self.element_mut(element)?.attributes.remove(key);
        if old.is_some() {
            self.pending.push(DomEvent::AttributeModified {
                element,
                key: key.to_owned(),
                old: old.clone(),
                new: None,
            });
        }
        Ok(old)
    }

    /// Add a class. Returns `false` if it was already present.
    pub fn add_class(&mut self, element: NodeId, class: &str) -> Result<bool, DomError> {
        match self.element(element)?.class_list_with(class) {
            Some(list) => self.set_attribute(element, "class", list).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove a class. Returns `false` if it was not present.
    pub fn remove_class(&mut self, element: NodeId, class: &str) -> Result<bool, DomError> {
        match self.element(element)?.class_list_without(class) {
            Some(list) => self.set_attribute(element, "class", list).map(|_| true),
            None => Ok(false),
        }
    }

    /// Toggle a class: add if absent, remove if present. Returns whether the
    /// class is present afterwards.
    pub fn toggle_class(&mut self, element: NodeId, class: &str) -> Result<bool, DomError> {
        if self.element(element)?.has_class(class) {
            self.remove_class(element, class).map(|_| false)
        } else {
            self.add_class(element, class).map(|_| true)
        }
    }

    /// Set the hover flag (`MouseEnter` / `MouseLeave`).
    pub fn set_hovered(&mut self, element: NodeId, hovered: bool) -> Result<(), DomError> {
        let data = self.element_mut(element)?;
        if mem::replace(&mut data.hovered, hovered) != hovered {
            let kind = if hovered {
                InteractionKind::MouseEnter
            } else {
                InteractionKind::MouseLeave
            };
            self.pending.push(DomEvent::Interaction { element, kind });
        }
        Ok(())
    }

    /// Set the click flag (`Click` / `ClickExpire`).
    pub fn set_active(&mut self, element: NodeId, active: bool) -> Result<(), DomError> {
        let data = self.element_mut(element)?;
        if mem::replace(&mut data.active, active) != active {
            let kind = if active {
                InteractionKind::Click
            } else {
                InteractionKind::ClickExpire
            };
            self.pending.push(DomEvent::Interaction { element, kind });
        }
        Ok(())
    }

    /// Record a text-input interaction on `element`.
    pub fn notify_input(&mut self, element: NodeId) -> Result<(), DomError> {
        self.element(element)?;
        self.pending.push(DomEvent::Interaction {
            element,
            kind: InteractionKind::Input,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Drain and return all pending events.
    ///
    /// After calling this, the pending event queue is empty.
    pub fn drain_events(&mut self) -> Vec<DomEvent> {
        mem::take(&mut self.pending)
    }

    /// Whether there are any pending events.
    pub fn has_pending_events(&self) -> bool {
        !self.pending.is_empty()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the DOM, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the DOM is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the DOM contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether `id` is the root or has the root among its ancestors.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let top = self.ancestors(id).last().copied().unwrap_or(id);
        self.root == Some(top)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            stack.extend(self.children(current).iter().rev());
        }
        result
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn element(&self, id: NodeId) -> Result<&NodeData, DomError> {
        let data = self.nodes.get(id).ok_or(DomError::UnknownNode(id))?;
        if !data.is_element() {
            return Err(DomError::NotAnElement(id));
        }
        Ok(data)
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        let data = self.nodes.get_mut(id).ok_or(DomError::UnknownNode(id))?;
        if !data.is_element() {
            return Err(DomError::NotAnElement(id));
        }
        Ok(data)
    }

    /// Remove `id` from its parent's child list; returns the old parent.
    fn unlink(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent.remove(id)?;
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|&child| child != id);
        }
        Some(parent)
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree for Dom {
    type Node = NodeId;

    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Dom::parent(self, node)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        Dom::children(self, node)
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(NodeData::is_element)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).and_then(NodeData::tag)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node).and_then(|data| data.attribute(name))
    }

    fn is_hovered(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(NodeData::is_hovered)
    }

    fn is_active(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(NodeData::is_active)
    }

    fn pseudo_element(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|data| data.pseudo_element.as_deref())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes.get(node).is_some_and(|data| data.has_class(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div").with_id("root"));
        let a = dom
            .insert_child(root, NodeData::element("section").with_id("a").with_class("left"))
            .unwrap();
        let b = dom
            .insert_child(root, NodeData::element("section").with_id("b").with_class("right"))
            .unwrap();
        let c = dom.insert_child(a, NodeData::element("button").with_id("c")).unwrap();
        let d = dom.insert_child(a, NodeData::element("label").with_id("d")).unwrap();
        dom.drain_events();
        (dom, root, a, b, c, d)
    }

    #[test]
    fn insert_sets_root_and_records_event() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::element("body"));
        assert_eq!(dom.root(), Some(id));
        assert_eq!(
            dom.drain_events(),
            vec![DomEvent::AppendChild {
                parent: None,
                node: id,
                index: 0
            }]
        );
    }

    #[test]
    fn insert_second_stays_detached() {
        let mut dom = Dom::new();
        let first = dom.insert(NodeData::element("first"));
        let second = dom.insert(NodeData::element("second"));
        assert_eq!(dom.root(), Some(first));
        assert!(!dom.is_attached(second));
        assert_eq!(dom.drain_events().len(), 1);
    }

    #[test]
    fn insert_child_parent_relationship() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.parent(a), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
        assert!(dom.is_attached(c));
    }

    #[test]
    fn children_list() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert!(dom.children(c).is_empty());
    }

    #[test]
    fn insert_child_under_text_fails() {
        let (mut dom, root, ..) = build_tree();
        let text = dom.insert_child(root, NodeData::text("hi")).unwrap();
        let err = dom.insert_child(text, NodeData::element("b")).unwrap_err();
        assert_eq!(err, DomError::NotAnElement(text));
    }

    #[test]
    fn insert_at_records_index() {
        let (mut dom, root, a, b, ..) = build_tree();
        let x = dom.create(NodeData::element("x"));
        dom.insert_at(root, 1, x).unwrap();
        assert_eq!(dom.children(root), &[a, x, b]);
        assert_eq!(
            dom.drain_events(),
            vec![DomEvent::AppendChild {
                parent: Some(root),
                node: x,
                index: 1
            }]
        );

        let y = dom.create(NodeData::element("y"));
        assert_eq!(
            dom.insert_at(root, 9, y),
            Err(DomError::IndexOutOfBounds { index: 9, len: 3 })
        );
    }

    #[test]
    fn append_rejects_attached_and_cycles() {
        let (mut dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.append_child(root, c), Err(DomError::AlreadyAttached(c)));
        assert_eq!(dom.append_child(c, root), Err(DomError::AlreadyAttached(root)));
        dom.detach(a).unwrap();
        assert_eq!(dom.append_child(c, a), Err(DomError::Cycle { node: a, parent: c }));
    }

    #[test]
    fn ancestors() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert_eq!(dom.ancestors(a), vec![root]);
        assert!(dom.ancestors(root).is_empty());
    }

    #[test]
    fn len_and_is_empty() {
        let (dom, ..) = build_tree();
        assert_eq!(dom.len(), 5);
        assert!(!dom.is_empty());

        let empty = Dom::new();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
    }

    #[test]
    fn remove_leaf() {
        let (mut dom, _root, a, _b, c, d) = build_tree();
        let removed = dom.remove(c).unwrap();
        assert_eq!(removed.tag(), Some("button"));
        assert!(!dom.contains(c));
        assert_eq!(dom.children(a), &[d]);
        assert_eq!(dom.len(), 4);
        assert_eq!(
            dom.drain_events(),
            vec![DomEvent::RemoveChild {
                parent: Some(a),
                node: c
            }]
        );
    }

    #[test]
    fn remove_subtree_records_one_event() {
        let (mut dom, root, a, b, c, d) = build_tree();
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert!(dom.contains(root));
        assert!(dom.contains(b));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.drain_events().len(), 1);
    }

    #[test]
    fn remove_root() {
        let (mut dom, root, ..) = build_tree();
        dom.remove(root);
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }

    #[test]
    fn remove_nonexistent() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::element("x"));
        dom.remove(id);
        assert!(dom.remove(id).is_none());
    }

    #[test]
    fn reparent() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        dom.reparent(c, b).unwrap();
        assert_eq!(dom.parent(c), Some(b));
        assert!(!dom.children(a).contains(&c));
        assert!(dom.children(b).contains(&c));
        assert_eq!(dom.ancestors(c), vec![b, root]);
        assert_eq!(
            dom.drain_events(),
            vec![
                DomEvent::RemoveChild {
                    parent: Some(a),
                    node: c
                },
                DomEvent::AppendChild {
                    parent: Some(b),
                    node: c,
                    index: 0
                },
            ]
        );
        assert_eq!(dom.reparent(a, c), Err(DomError::Cycle { node: a, parent: c }));
    }

    #[test]
    fn attributes_record_changes_only() {
        let (mut dom, _root, a, ..) = build_tree();
        assert_eq!(dom.set_attribute(a, "title", "x").unwrap(), None);
        assert_eq!(dom.set_attribute(a, "title", "x").unwrap().as_deref(), Some("x"));
        assert_eq!(dom.remove_attribute(a, "title").unwrap().as_deref(), Some("x"));
        assert_eq!(dom.remove_attribute(a, "title").unwrap(), None);

        let events = dom.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            DomEvent::AttributeModified { key, old: Some(_), new: None, .. } if key == "title"
        ));
    }

    #[test]
    fn class_edits_go_through_attribute() {
        let (mut dom, _root, a, ..) = build_tree();
        assert!(dom.add_class(a, "wide").unwrap());
        assert!(!dom.add_class(a, "wide").unwrap());
        assert!(dom.get(a).unwrap().has_class("wide"));
        assert!(!dom.toggle_class(a, "left").unwrap());
        assert!(dom.remove_class(a, "wide").unwrap());
        assert_eq!(dom.get(a).unwrap().attribute("class"), Some(""));
        assert_eq!(dom.drain_events().len(), 3);
    }

    #[test]
    fn interaction_flags() {
        let (mut dom, _root, a, ..) = build_tree();
        dom.set_hovered(a, true).unwrap();
        dom.set_hovered(a, true).unwrap();
        dom.set_active(a, true).unwrap();
        dom.set_active(a, false).unwrap();
        dom.notify_input(a).unwrap();
        let kinds: Vec<_> = dom
            .drain_events()
            .into_iter()
            .map(|event| match event {
                DomEvent::Interaction { kind, .. } => kind,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                InteractionKind::MouseEnter,
                InteractionKind::Click,
                InteractionKind::ClickExpire,
                InteractionKind::Input,
            ]
        );
        assert!(DomTree::is_hovered(&dom, a));
        assert!(!DomTree::is_active(&dom, a));
    }

    #[test]
    fn walk_depth_first() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(dom.walk_depth_first(a), vec![a, c, d]);
    }

    #[test]
    fn dom_tree_navigation() {
        let (mut dom, root, a, b, c, d) = build_tree();
        let text = dom.insert_child(a, NodeData::text("tail")).unwrap();
        assert_eq!(DomTree::depth(&dom, c), 2);
        assert_eq!(DomTree::depth(&dom, root), 0);
        assert_eq!(dom.previous_element_sibling(d), Some(c));
        assert_eq!(dom.next_element_sibling(d), None);
        assert_eq!(dom.next_element_sibling(a), Some(b));
        assert!(!DomTree::is_element(&dom, text));
        assert_eq!(dom.element_id(b), Some("b"));
        assert!(DomTree::has_class(&dom, b, "right"));
    }

    #[test]
    fn default_impl() {
        let dom = Dom::default();
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }
}
