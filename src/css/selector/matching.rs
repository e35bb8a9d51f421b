//! Per-matcher tests: simple selectors, pseudo-classes and pseudo-functions.

use std::fmt;

use crate::css::model::AttributeOperator;
use crate::css::selector::anb::{AnB, IndexResult};
use crate::css::selector::Matcher;
use crate::dom::traits::DomTree;

// ---------------------------------------------------------------------------
// PseudoClass / PseudoElement
// ---------------------------------------------------------------------------

/// Supported pseudo-classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    Hover,
    Active,
    Root,
    Enabled,
    Disabled,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
}

impl PseudoClass {
    const ALL: [PseudoClass; 11] = [
        PseudoClass::Hover,
        PseudoClass::Active,
        PseudoClass::Root,
        PseudoClass::Enabled,
        PseudoClass::Disabled,
        PseudoClass::FirstChild,
        PseudoClass::LastChild,
        PseudoClass::OnlyChild,
        PseudoClass::FirstOfType,
        PseudoClass::LastOfType,
        PseudoClass::OnlyOfType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PseudoClass::Hover => "hover",
            PseudoClass::Active => "active",
            PseudoClass::Root => "root",
            PseudoClass::Enabled => "enabled",
            PseudoClass::Disabled => "disabled",
            PseudoClass::FirstChild => "first-child",
            PseudoClass::LastChild => "last-child",
            PseudoClass::OnlyChild => "only-child",
            PseudoClass::FirstOfType => "first-of-type",
            PseudoClass::LastOfType => "last-of-type",
            PseudoClass::OnlyOfType => "only-of-type",
        }
    }

    /// Look up a pseudo-class by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Pseudo-classes whose result depends on the element's siblings.
    pub fn is_positional(self) -> bool {
        !matches!(
            self,
            PseudoClass::Hover
                | PseudoClass::Active
                | PseudoClass::Root
                | PseudoClass::Enabled
                | PseudoClass::Disabled
        )
    }

    fn test<D: DomTree>(self, dom: &D, el: D::Node) -> bool {
        match self {
            PseudoClass::Hover => dom.is_hovered(el),
            PseudoClass::Active => dom.is_active(el),
            PseudoClass::Root => dom.root() == Some(el),
            PseudoClass::Enabled => button_enabled(dom, el) == Some(true),
            PseudoClass::Disabled => button_enabled(dom, el) == Some(false),
            PseudoClass::FirstChild => {
                dom.parent(el).is_some() && dom.previous_element_sibling(el).is_none()
            }
            PseudoClass::LastChild => {
                dom.parent(el).is_some() && dom.next_element_sibling(el).is_none()
            }
            PseudoClass::OnlyChild => {
                dom.parent(el).is_some()
                    && dom.previous_element_sibling(el).is_none()
                    && dom.next_element_sibling(el).is_none()
            }
            PseudoClass::FirstOfType => nth_of_type(dom, el, false, AnB::new(0, 1)),
            PseudoClass::LastOfType => nth_of_type(dom, el, true, AnB::new(0, 1)),
            PseudoClass::OnlyOfType => {
                let tag = dom.tag_name(el);
                IndexResult::of(dom, el, false, |n| dom.tag_name(n) == tag).count == 1
            }
        }
    }
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported pseudo-elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    /// Placeholder text of an input.
    Placeholder,
}

impl PseudoElement {
    pub fn name(self) -> &'static str {
        match self {
            PseudoElement::Placeholder => "placeholder",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        name.eq_ignore_ascii_case("placeholder")
            .then_some(PseudoElement::Placeholder)
    }
}

impl fmt::Display for PseudoElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Matcher::test
// ---------------------------------------------------------------------------

impl Matcher {
    /// Test this matcher against a single element.
    pub fn test<D: DomTree>(&self, dom: &D, root: Option<D::Node>, el: D::Node) -> bool {
        match self {
            Matcher::Tag(name) => dom
                .tag_name(el)
                .is_some_and(|tag| tag.eq_ignore_ascii_case(name)),
            Matcher::Class(class) => dom.has_class(el, class),
            Matcher::Id(id) => dom.element_id(el) == Some(id.as_str()),
            Matcher::Attribute { name, op, value } => {
                attribute_matches(dom.attribute(el, name), *op, value)
            }
            Matcher::PseudoClass(pseudo) => pseudo.test(dom, el),
            Matcher::PseudoElement(pseudo) => dom
                .pseudo_element(el)
                .is_some_and(|name| name.eq_ignore_ascii_case(pseudo.name())),
            Matcher::NthChild { from_end, index } => index.test(dom, root, el, *from_end),
            Matcher::NthOfType { from_end, anb } => nth_of_type(dom, el, *from_end, *anb),
            Matcher::Is(group) => group.test(dom, root, el),
            Matcher::Not(group) => !group.test(dom, root, el),
            Matcher::Scope(group) => group.test(dom, root, el),
            Matcher::Never(_) => false,
        }
    }
}

fn attribute_matches(actual: Option<&str>, op: AttributeOperator, expected: &str) -> bool {
    let Some(actual) = actual.filter(|v| !v.is_empty()) else {
        return false;
    };

    match op {
        AttributeOperator::Has => true,
        AttributeOperator::Equals => actual == expected,
        AttributeOperator::ContainsWord => actual.split_ascii_whitespace().any(|w| w == expected),
        AttributeOperator::DashPrefixed => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttributeOperator::StartsWith => actual.starts_with(expected),
        AttributeOperator::EndsWith => actual.ends_with(expected),
        AttributeOperator::ContainsSubstring => actual.contains(expected),
    }
}

/// `Some(true)` / `Some(false)` for buttons, `None` for anything else or an
/// unrecognised `enabled` value.
fn button_enabled<D: DomTree>(dom: &D, el: D::Node) -> Option<bool> {
    if !dom.tag_name(el).is_some_and(|t| t.eq_ignore_ascii_case("button")) {
        return None;
    }
    match dom.attribute(el, "enabled") {
        None | Some("") | Some("true") => Some(true),
        Some("false") => Some(false),
        Some(_) => None,
    }
}

fn nth_of_type<D: DomTree>(dom: &D, el: D::Node, from_end: bool, anb: AnB) -> bool {
    let tag = dom.tag_name(el);
    IndexResult::of(dom, el, from_end, |n| dom.tag_name(n) == tag)
        .index
        .is_some_and(|i| anb.index_matches(i))
}
