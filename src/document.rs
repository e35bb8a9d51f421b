//! Document: a [`Dom`] and its [`StyleEngine`] kept in sync.
//!
//! Every mutating call goes through the document, which hands the DOM's
//! pending events to the engine before returning. A style query right after a
//! mutation therefore always sees the restyled tree.

use crate::css::property::{Property, PropertyId, PropertyType};
use crate::css::property_set::PropertySet;
use crate::css::stylesheet::Stylesheet;
use crate::css::value::Value;
use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::{Dom, DomError};
use crate::style::{
    ComputedStyle, DeclarationParser, EngineConfig, InlineStyleParser, SheetId, StyleEngine,
    StyleTreeError, StyleUpdate, SubscriptionId,
};

/// Errors from document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Style(#[from] StyleTreeError),
}

/// A DOM plus the engine styling it.
///
/// Style attributes are read with [`DeclarationParser`] unless another parser
/// is installed, so inline properties survive an element being detached and
/// tracked again.
#[derive(Debug)]
pub struct Document {
    dom: Dom,
    engine: StyleEngine,
}

impl Default for Document {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut engine = StyleEngine::with_config(config);
        engine.set_inline_parser(DeclarationParser);
        Self {
            dom: Dom::new(),
            engine,
        }
    }

    /// Read access to the tree. Mutate through the document (or
    /// [`Document::mutate`]) so the engine sees every change.
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn engine(&self) -> &StyleEngine {
        &self.engine
    }

    // -----------------------------------------------------------------------
    // Stylesheets and collaborators
    // -----------------------------------------------------------------------

    pub fn add_stylesheet(&mut self, sheet: Stylesheet) -> SheetId {
        self.engine.add_stylesheet(&self.dom, sheet)
    }

    pub fn remove_stylesheet(&mut self, id: SheetId) -> Option<Stylesheet> {
        self.engine.remove_stylesheet(&self.dom, id)
    }

    pub fn replace_stylesheet(&mut self, id: SheetId, sheet: Stylesheet) -> Option<Stylesheet> {
        self.engine.replace_stylesheet(&self.dom, id, sheet)
    }

    pub fn set_default_stylesheet(&mut self, sheet: Option<Stylesheet>) {
        self.engine.set_default_stylesheet(&self.dom, sheet);
    }

    pub fn set_inline_parser(&mut self, parser: impl InlineStyleParser + 'static) {
        self.engine.set_inline_parser(parser);
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&StyleUpdate) + 'static) -> SubscriptionId {
        self.engine.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.engine.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Run arbitrary DOM edits, then deliver their events to the engine.
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut Dom) -> R) -> Result<R, DocumentError> {
        let out = f(&mut self.dom);
        self.flush()?;
        Ok(out)
    }

    /// Insert a parentless node; the first one becomes the root.
    pub fn insert(&mut self, data: NodeData) -> Result<NodeId, DocumentError> {
        self.mutate(|dom| dom.insert(data))
    }

    pub fn insert_child(
        &mut self,
        parent: NodeId,
        data: NodeData,
    ) -> Result<NodeId, DocumentError> {
        self.mutate(|dom| dom.insert_child(parent, data))?
            .map_err(DocumentError::from)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        Ok(self.mutate(|dom| dom.append_child(parent, child))??)
    }

    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), DocumentError> {
        Ok(self.mutate(|dom| dom.reparent(node, new_parent))??)
    }

    /// Remove a node and its subtree. Returns its data, `None` if unknown.
    pub fn remove(&mut self, node: NodeId) -> Result<Option<NodeData>, DocumentError> {
        self.mutate(|dom| dom.remove(node))
    }

    pub fn set_attribute(
        &mut self,
        element: NodeId,
        key: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, DocumentError> {
        Ok(self.mutate(|dom| dom.set_attribute(element, key, value))??)
    }

    pub fn remove_attribute(
        &mut self,
        element: NodeId,
        key: &str,
    ) -> Result<Option<String>, DocumentError> {
        Ok(self.mutate(|dom| dom.remove_attribute(element, key))??)
    }

    pub fn add_class(&mut self, element: NodeId, class: &str) -> Result<bool, DocumentError> {
        Ok(self.mutate(|dom| dom.add_class(element, class))??)
    }

    pub fn remove_class(&mut self, element: NodeId, class: &str) -> Result<bool, DocumentError> {
        Ok(self.mutate(|dom| dom.remove_class(element, class))??)
    }

    pub fn toggle_class(&mut self, element: NodeId, class: &str) -> Result<bool, DocumentError> {
        Ok(self.mutate(|dom| dom.toggle_class(element, class))??)
    }

    pub fn set_hovered(&mut self, element: NodeId, hovered: bool) -> Result<(), DocumentError> {
        Ok(self.mutate(|dom| dom.set_hovered(element, hovered))??)
    }

    pub fn set_active(&mut self, element: NodeId, active: bool) -> Result<(), DocumentError> {
        Ok(self.mutate(|dom| dom.set_active(element, active))??)
    }

    pub fn notify_input(&mut self, element: NodeId) -> Result<(), DocumentError> {
        Ok(self.mutate(|dom| dom.notify_input(element))??)
    }

    fn flush(&mut self) -> Result<(), DocumentError> {
        for event in self.dom.drain_events() {
            self.engine.handle_event(&self.dom, &event)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Styles
    // -----------------------------------------------------------------------

    pub fn resolved_style(&mut self, node: NodeId) -> Result<&PropertySet, DocumentError> {
        self.known(node)?;
        Ok(self.engine.resolved_style(&self.dom, node)?)
    }

    pub fn computed_style(&mut self, node: NodeId) -> Result<ComputedStyle, DocumentError> {
        self.known(node)?;
        Ok(self.engine.computed_style(&self.dom, node)?)
    }

    /// Recompute every node from the root.
    pub fn update_from_root(&mut self) -> Result<(), DocumentError> {
        Ok(self.engine.update_from_root(&self.dom)?)
    }

    /// Set one inline property and write the serialized inline set back to
    /// the element's style attribute.
    pub fn set_inline_property<T: PropertyType + Copy>(
        &mut self,
        element: NodeId,
        property: &Property<T>,
        value: Value<T>,
    ) -> Result<(), DocumentError> {
        self.edit_inline(element, |set| set.set(property, value))
    }

    /// Remove one inline property, updating the style attribute.
    pub fn remove_inline_property(
        &mut self,
        element: NodeId,
        id: PropertyId,
    ) -> Result<(), DocumentError> {
        self.edit_inline(element, |set| {
            set.remove(id);
        })
    }

    fn edit_inline(
        &mut self,
        element: NodeId,
        edit: impl FnOnce(&mut PropertySet),
    ) -> Result<(), DocumentError> {
        self.known(element)?;
        let mut inline = self.engine.inline_style(&self.dom, element)?;
        edit(&mut *inline);
        inline.commit()?;

        let text = self.engine.inline_set(element)?.to_inline_string();
        self.engine.set_suppress_inline_updates(element, true)?;
        let written = self.write_style_attribute(element, text);
        self.engine.set_suppress_inline_updates(element, false)?;
        written
    }

    fn write_style_attribute(
        &mut self,
        element: NodeId,
        text: String,
    ) -> Result<(), DocumentError> {
        let attribute = self.engine.config().style_attribute.clone();
        self.dom.set_attribute(element, &attribute, text)?;
        self.flush()
    }

    fn known(&self, node: NodeId) -> Result<(), DomError> {
        if self.dom.contains(node) {
            Ok(())
        } else {
            Err(DomError::UnknownNode(node))
        }
    }
}
