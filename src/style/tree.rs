//! The style tree: one [`StyleNode`] per tracked DOM node, mirroring the
//! DOM's shape.
//!
//! Nodes live in a slotmap arena addressed by [`StyleKey`]. A node stores its
//! parent's key; element nodes own the ordered list of their children's keys.
//! A separate index maps DOM node handles to keys.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use slotmap::{new_key_type, SlotMap};

use crate::css::property_set::PropertySet;
use crate::dom::node::NodeId;

new_key_type! {
    /// Handle of a node in the style tree.
    pub struct StyleKey;
}

/// Structural violations while maintaining the style tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleTreeError<N: Debug = NodeId> {
    #[error("style node for {0:?} already has a parent")]
    AlreadyHasParent(N),

    #[error("{0:?} has no style node")]
    NotTracked(N),

    #[error("{0:?} is not an element")]
    NotAnElement(N),
}

// ---------------------------------------------------------------------------
// StyleNode
// ---------------------------------------------------------------------------

/// Element-only state of a style node.
#[derive(Debug, Clone, Default)]
pub struct ElementBlock {
    pub(crate) children: Vec<StyleKey>,
    pub(crate) inline_set: PropertySet,
    pub(crate) suppressing_inline_updates: bool,
}

impl ElementBlock {
    pub fn children(&self) -> &[StyleKey] {
        &self.children
    }

    /// Properties declared on the element itself (its style attribute or the
    /// programmatic inline API).
    pub fn inline_set(&self) -> &PropertySet {
        &self.inline_set
    }

    /// While set, changes to the style attribute are not parsed back into
    /// the inline set.
    pub fn is_suppressing_inline_updates(&self) -> bool {
        self.suppressing_inline_updates
    }
}

/// Shadow record for one DOM node.
#[derive(Debug, Clone)]
pub struct StyleNode<N> {
    dom_node: N,
    parent: Option<StyleKey>,
    /// Resolved set after the last cascade.
    pub(crate) style_set: PropertySet,
    /// Snapshot last reported to observers.
    pub(crate) computed: PropertySet,
    /// `None` for text and other non-element nodes.
    pub(crate) element: Option<ElementBlock>,
}

impl<N: Copy> StyleNode<N> {
    fn new(dom_node: N, is_element: bool) -> Self {
        Self {
            dom_node,
            parent: None,
            style_set: PropertySet::new(),
            computed: PropertySet::new(),
            element: is_element.then(ElementBlock::default),
        }
    }

    /// The DOM node this record shadows.
    pub fn dom_node(&self) -> N {
        self.dom_node
    }

    pub fn parent(&self) -> Option<StyleKey> {
        self.parent
    }

    /// The resolved style.
    pub fn style_set(&self) -> &PropertySet {
        &self.style_set
    }

    /// The last snapshot handed to observers.
    pub fn computed(&self) -> &PropertySet {
        &self.computed
    }

    pub fn is_element(&self) -> bool {
        self.element.is_some()
    }

    pub fn element(&self) -> Option<&ElementBlock> {
        self.element.as_ref()
    }

    /// Children in DOM order; empty for non-elements.
    pub fn children(&self) -> &[StyleKey] {
        self.element
            .as_ref()
            .map(|block| block.children.as_slice())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// StyleTree
// ---------------------------------------------------------------------------

/// Arena of style nodes plus the DOM-handle index.
#[derive(Debug)]
pub struct StyleTree<N> {
    nodes: SlotMap<StyleKey, StyleNode<N>>,
    index: HashMap<N, StyleKey>,
    root: Option<StyleKey>,
}

impl<N: Copy + Eq + Hash + Debug> StyleTree<N> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            index: HashMap::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<StyleKey> {
        self.root
    }

    /// The key tracking `dom_node`, if any.
    pub fn key(&self, dom_node: N) -> Option<StyleKey> {
        self.index.get(&dom_node).copied()
    }

    pub fn get(&self, key: StyleKey) -> Option<&StyleNode<N>> {
        self.nodes.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: StyleKey) -> Option<&mut StyleNode<N>> {
        self.nodes.get_mut(key)
    }

    /// The style node tracking `dom_node`.
    pub fn node(&self, dom_node: N) -> Option<&StyleNode<N>> {
        self.key(dom_node).and_then(|key| self.nodes.get(key))
    }

    /// Create an unattached style node for `dom_node`.
    ///
    /// Returns the existing key if the node is already tracked.
    pub fn create(&mut self, dom_node: N, is_element: bool) -> StyleKey {
        if let Some(key) = self.key(dom_node) {
            return key;
        }
        let key = self.nodes.insert(StyleNode::new(dom_node, is_element));
        self.index.insert(dom_node, key);
        key
    }

    /// Make `dom_node` the root. Its style node must not have a parent.
    pub fn set_root(&mut self, dom_node: N) -> Result<StyleKey, StyleTreeError<N>> {
        let key = self
            .key(dom_node)
            .ok_or(StyleTreeError::NotTracked(dom_node))?;
        if self.nodes[key].parent.is_some() {
            return Err(StyleTreeError::AlreadyHasParent(dom_node));
        }
        self.root = Some(key);
        Ok(key)
    }

    /// Insert `child`'s style node into `parent`'s child list at `index`
    /// (clamped to the list length).
    pub fn attach(&mut self, parent: N, child: N, index: usize) -> Result<(), StyleTreeError<N>> {
        let parent_key = self.key(parent).ok_or(StyleTreeError::NotTracked(parent))?;
        let child_key = self.key(child).ok_or(StyleTreeError::NotTracked(child))?;
        if self.nodes[child_key].parent.is_some() || self.root == Some(child_key) {
            return Err(StyleTreeError::AlreadyHasParent(child));
        }

        let block = self.nodes[parent_key]
            .element
            .as_mut()
            .ok_or(StyleTreeError::NotAnElement(parent))?;
        let index = index.min(block.children.len());
        block.children.insert(index, child_key);
        self.nodes[child_key].parent = Some(parent_key);
        Ok(())
    }

    /// Destroy the style node for `dom_node` and its whole subtree.
    ///
    /// Returns the DOM handles that stopped being tracked, top-down.
    pub fn remove(&mut self, dom_node: N) -> Result<Vec<N>, StyleTreeError<N>> {
        let key = self
            .key(dom_node)
            .ok_or(StyleTreeError::NotTracked(dom_node))?;

        if let Some(parent) = self.nodes.get(key).and_then(|node| node.parent) {
            if let Some(block) = self.nodes.get_mut(parent).and_then(|p| p.element.as_mut()) {
                block.children.retain(|&c| c != key);
            }
        }
        if self.root == Some(key) {
            self.root = None;
        }

        let mut removed = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                self.index.remove(&node.dom_node);
                removed.push(node.dom_node);
                stack.extend(node.children().iter().rev());
            }
        }
        Ok(removed)
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.root = None;
    }

    /// Keys of the subtree under `key`, pre-order (parents before children).
    pub fn subtree(&self, key: StyleKey) -> Vec<StyleKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                out.push(current);
                stack.extend(node.children().iter().rev());
            }
        }
        out
    }
}

impl<N: Copy + Eq + Hash + Debug> Default for StyleTree<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// ```text
    ///     1
    ///    / \
    ///   2   3
    ///   |
    ///   4 (text)
    /// ```
    fn build() -> StyleTree<u32> {
        let mut tree = StyleTree::new();
        tree.create(1, true);
        tree.set_root(1).unwrap();
        for (parent, child, element) in [(1, 2, true), (1, 3, true), (2, 4, false)] {
            tree.create(child, element);
            tree.attach(parent, child, usize::MAX).unwrap();
        }
        tree
    }

    fn dom_nodes(tree: &StyleTree<u32>, keys: &[StyleKey]) -> Vec<u32> {
        keys.iter()
            .filter_map(|&k| tree.get(k).map(StyleNode::dom_node))
            .collect()
    }

    #[test]
    fn mirrors_shape() {
        let tree = build();
        assert_eq!(tree.len(), 4);
        let root = tree.root().unwrap();
        assert_eq!(dom_nodes(&tree, tree.get(root).unwrap().children()), vec![2, 3]);
        assert_eq!(tree.node(4).unwrap().parent(), tree.key(2));
        assert!(!tree.node(4).unwrap().is_element());
        assert_eq!(dom_nodes(&tree, &tree.subtree(root)), vec![1, 2, 4, 3]);
    }

    #[test]
    fn create_is_idempotent() {
        let mut tree = build();
        let key = tree.key(3).unwrap();
        assert_eq!(tree.create(3, true), key);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn attach_at_index_clamps() {
        let mut tree = build();
        tree.create(5, true);
        tree.attach(1, 5, 0).unwrap();
        tree.create(6, true);
        tree.attach(1, 6, 99).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(dom_nodes(&tree, tree.get(root).unwrap().children()), vec![5, 2, 3, 6]);
    }

    #[test]
    fn attach_violations() {
        let mut tree = build();
        assert_eq!(tree.attach(1, 2, 0), Err(StyleTreeError::AlreadyHasParent(2)));
        assert_eq!(tree.attach(3, 1, 0), Err(StyleTreeError::AlreadyHasParent(1)));
        assert_eq!(tree.attach(1, 9, 0), Err(StyleTreeError::NotTracked(9)));
        tree.create(7, true);
        assert_eq!(tree.attach(4, 7, 0), Err(StyleTreeError::NotAnElement(4)));
        assert_eq!(tree.set_root(2), Err(StyleTreeError::AlreadyHasParent(2)));
    }

    #[test]
    fn remove_subtree() {
        let mut tree = build();
        assert_eq!(tree.remove(2).unwrap(), vec![2, 4]);
        assert_eq!(tree.len(), 2);
        assert!(tree.key(4).is_none());
        let root = tree.root().unwrap();
        assert_eq!(dom_nodes(&tree, tree.get(root).unwrap().children()), vec![3]);
        assert_eq!(tree.remove(2), Err(StyleTreeError::NotTracked(2)));
    }

    #[test]
    fn remove_root_empties_tree() {
        let mut tree = build();
        tree.remove(1).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
    }

    #[test]
    fn error_messages() {
        let err: StyleTreeError<u32> = StyleTreeError::NotTracked(3);
        assert_eq!(err.to_string(), "3 has no style node");
    }
}
