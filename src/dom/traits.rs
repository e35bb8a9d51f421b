//! The navigation surface the style engine needs from a document tree.

use std::fmt::Debug;
use std::hash::Hash;

/// Read-only navigation over an observable document tree.
///
/// Selector matching and the cascade only ever look at the tree through this
/// trait, so any DOM that can answer these questions can be styled. Node
/// handles must be stable for as long as the node is attached and usable as
/// map keys.
pub trait DomTree {
    type Node: Copy + Eq + Hash + Debug;

    /// The document root, if the tree has one.
    fn root(&self) -> Option<Self::Node>;

    /// Parent node, `None` for the root or a detached node.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Children in document order (elements and text alike).
    fn children(&self, node: Self::Node) -> &[Self::Node];

    /// `false` for text and other non-element nodes.
    fn is_element(&self, node: Self::Node) -> bool;

    /// Lower-case tag name of an element.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// Attribute value, if the attribute is present.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Whether the pointer is over the element.
    fn is_hovered(&self, node: Self::Node) -> bool;

    /// Whether the element is being clicked.
    fn is_active(&self, node: Self::Node) -> bool;

    /// The pseudo-element this node represents (`placeholder`), if any.
    fn pseudo_element(&self, _node: Self::Node) -> Option<&str> {
        None
    }

    /// The `id` attribute.
    fn element_id(&self, node: Self::Node) -> Option<&str> {
        self.attribute(node, "id")
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    fn has_class(&self, node: Self::Node, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    /// Number of ancestors above `node`; the root has depth 0.
    fn depth(&self, node: Self::Node) -> usize {
        let mut depth = 0;
        let mut current = self.parent(node);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }

    /// The closest preceding sibling that is an element.
    fn previous_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&n| n == node)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&n| self.is_element(n))
    }

    /// The closest following sibling that is an element.
    fn next_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&n| n == node)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|&n| self.is_element(n))
    }
}
