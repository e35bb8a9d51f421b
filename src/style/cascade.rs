//! Cascade and value resolution for a single node.
//!
//! The working set for an element is built in this order:
//!
//! 1. cascading properties copied unchanged from the parent's resolved set,
//! 2. every matching rule, ascending in cascade order, merged with
//!    [`PropertySet::try_set`],
//! 3. the element's inline set, merged the same way,
//!
//! and then every keyword value (`inherit`, `initial`, `unset`) is resolved.
//! Non-element nodes only take the parent's cascading properties.

use crate::css::property::{PropertyId, PropertyValue};
use crate::css::property_set::PropertySet;
use crate::css::stylesheet::{Rule, Stylesheet};
use crate::css::value::{Value, ValueKind};
use crate::dom::traits::DomTree;

/// Cascade context shared by every node of one recompute pass.
pub struct Cascade<'a, D: DomTree> {
    dom: &'a D,
    default_sheet: Option<&'a Stylesheet>,
}

impl<'a, D: DomTree> Cascade<'a, D> {
    pub fn new(dom: &'a D, default_sheet: Option<&'a Stylesheet>) -> Self {
        Self { dom, default_sheet }
    }

    /// Resolved set for the element `el`.
    ///
    /// `rules` must be in ascending cascade order.
    pub fn element<'r>(
        &self,
        el: D::Node,
        parent: Option<&PropertySet>,
        rules: impl IntoIterator<Item = &'r Rule>,
        inline: Option<&PropertySet>,
    ) -> PropertySet {
        let mut working = parent.map(inherited).unwrap_or_default();

        for rule in rules {
            if rule.matches(self.dom, el) {
                working.merge_from(rule.properties());
            }
        }
        if let Some(inline) = inline {
            working.merge_from(inline);
        }

        let mut resolved = PropertySet::new();
        for (id, value) in working.iter() {
            if let Some(value) = self.resolve(el, id, value, parent) {
                resolved.set_value(id, value);
            }
        }
        resolved
    }

    /// Resolved set for a text (or other non-element) node.
    pub fn text(&self, parent: Option<&PropertySet>) -> PropertySet {
        parent.map(inherited).unwrap_or_default()
    }

    /// Resolve one declared value. `None` leaves the property absent.
    pub fn resolve(
        &self,
        el: D::Node,
        id: PropertyId,
        value: &Value<PropertyValue>,
        parent: Option<&PropertySet>,
    ) -> Option<Value<PropertyValue>> {
        match value.kind() {
            ValueKind::Explicit(_) | ValueKind::Auto => Some(value.clone()),
            ValueKind::Inherit => parent?.value(id).cloned(),
            ValueKind::Unset => Some(Value::explicit(id.info().default)),
            ValueKind::Initial => {
                let initial = self.initial_value(el, id)?;
                // One more step for keywords in the default sheet; `initial`
                // there has nothing further to look up.
                match initial.kind() {
                    ValueKind::Initial => None,
                    _ => self.resolve(el, id, &initial, parent),
                }
            }
        }
    }

    /// The value the first matching default-sheet rule declares for `id`.
    pub fn initial_value(&self, el: D::Node, id: PropertyId) -> Option<Value<PropertyValue>> {
        self.default_sheet?
            .rules()
            .iter()
            .filter(|rule| rule.properties().has(id))
            .find(|rule| rule.matches(self.dom, el))
            .and_then(|rule| rule.properties().value(id).cloned())
    }
}

/// Values a child starts from: the cascading properties of `parent`, as
/// resolved there (importance included).
pub fn inherited(parent: &PropertySet) -> PropertySet {
    let mut out = PropertySet::new();
    for (id, value) in parent.iter() {
        if id.info().cascading {
            out.set_value(id, value.clone());
        }
    }
    out
}
