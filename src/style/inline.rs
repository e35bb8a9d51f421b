//! Inline styles: the parser seam for style attribute text and the editing
//! handle returned by [`StyleEngine::inline_style`].

use std::ops::{Deref, DerefMut};

use crate::css::declaration::parse_declarations;
use crate::css::property_set::PropertySet;
use crate::dom::traits::DomTree;

use super::engine::StyleEngine;
use super::tree::StyleTreeError;

/// Turns the text of an element's style attribute into declarations.
///
/// The engine only calls this when the attribute changes, or when an element
/// carrying one starts being tracked.
pub trait InlineStyleParser {
    fn parse(&self, text: &str) -> PropertySet;
}

impl<F> InlineStyleParser for F
where
    F: Fn(&str) -> PropertySet,
{
    fn parse(&self, text: &str) -> PropertySet {
        self(text)
    }
}

/// Reads the `key: value; key: value !important` form that
/// [`PropertySet::to_inline_string`] writes. Bad declarations are logged and
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationParser;

impl InlineStyleParser for DeclarationParser {
    fn parse(&self, text: &str) -> PropertySet {
        let (set, errors) = parse_declarations(text);
        for err in errors {
            tracing::warn!(%err, "skipping inline declaration");
        }
        set
    }
}

/// Mutable access to an element's inline declarations.
///
/// Derefs to the [`PropertySet`]. The changes are written back and the
/// element restyled on [`InlineStyle::commit`], or when the handle drops.
pub struct InlineStyle<'a, D: DomTree> {
    engine: &'a mut StyleEngine<D::Node>,
    dom: &'a D,
    element: D::Node,
    set: PropertySet,
    committed: bool,
}

impl<'a, D: DomTree> InlineStyle<'a, D> {
    pub(crate) fn new(
        engine: &'a mut StyleEngine<D::Node>,
        dom: &'a D,
        element: D::Node,
        set: PropertySet,
    ) -> Self {
        Self {
            engine,
            dom,
            element,
            set,
            committed: false,
        }
    }

    pub fn element(&self) -> D::Node {
        self.element
    }

    /// Apply the edits now.
    pub fn commit(mut self) -> Result<(), StyleTreeError<D::Node>> {
        self.apply()
    }

    fn apply(&mut self) -> Result<(), StyleTreeError<D::Node>> {
        self.committed = true;
        let set = std::mem::take(&mut self.set);
        self.engine.set_inline(self.dom, self.element, set)
    }
}

impl<D: DomTree> Deref for InlineStyle<'_, D> {
    type Target = PropertySet;

    fn deref(&self) -> &PropertySet {
        &self.set
    }
}

impl<D: DomTree> DerefMut for InlineStyle<'_, D> {
    fn deref_mut(&mut self) -> &mut PropertySet {
        &mut self.set
    }
}

impl<D: DomTree> Drop for InlineStyle<'_, D> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = self.apply() {
            tracing::warn!(element = ?self.element, %err, "dropping inline style edit");
        }
    }
}
