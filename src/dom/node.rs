//! Node types: NodeId, NodeKind, NodeData.

use std::collections::BTreeMap;

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Element or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a lower-case tag name.
    Element { tag: String },
    /// A run of text.
    Text { content: String },
}

/// Data associated with a single DOM node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Attributes by name. Always empty for text nodes.
    pub(crate) attributes: BTreeMap<String, String>,
    /// Pointer is over the element (`:hover`).
    pub(crate) hovered: bool,
    /// Element is being clicked (`:active`).
    pub(crate) active: bool,
    /// The pseudo-element this node stands for, e.g. `placeholder`.
    pub pseudo_element: Option<String>,
}

impl NodeData {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            hovered: false,
            active: false,
            pseudo_element: None,
        }
    }

    /// Create an element. The tag name is stored lower-cased.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Element {
            tag: tag.into().to_ascii_lowercase(),
        })
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text {
            content: content.into(),
        })
    }

    /// Set the `id` attribute (builder).
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    /// Add a single class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(&class.into());
        self
    }

    /// Add multiple classes (builder).
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            self.add_class(&class.into());
        }
        self
    }

    /// Set an attribute (builder). Ignored for text nodes.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if self.is_element() {
            self.attributes.insert(name.into(), value.into());
        }
        self
    }

    /// Mark this node as a pseudo-element (builder).
    pub fn with_pseudo_element(mut self, name: impl Into<String>) -> Self {
        self.pseudo_element = Some(name.into());
        self
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    /// Tag name, `None` for text.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    /// Text content, `None` for elements.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content } => Some(content),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterate attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Iterate the whitespace-separated classes.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    /// Check whether this node has a given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The `class` attribute after adding `class`, or `None` if already present.
    pub(crate) fn class_list_with(&self, class: &str) -> Option<String> {
        if self.has_class(class) {
            return None;
        }
        let mut classes: Vec<&str> = self.classes().collect();
        classes.push(class);
        Some(classes.join(" "))
    }

    /// The `class` attribute after removing `class`, or `None` if absent.
    pub(crate) fn class_list_without(&self, class: &str) -> Option<String> {
        if !self.has_class(class) {
            return None;
        }
        Some(
            self.classes()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    fn add_class(&mut self, class: &str) {
        if let Some(list) = self.class_list_with(class) {
            self.attributes.insert("class".to_owned(), list);
        }
    }
}
