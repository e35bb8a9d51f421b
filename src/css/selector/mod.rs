//! Compiled selectors.
//!
//! A [`Selector`] is a chain of [`SelectorNode`]s, each an AND-list of
//! [`Matcher`]s, linked by [`Combinator`]s. A [`SelectorGroup`] is the
//! OR-list produced by a comma-separated selector list. Compilation from the
//! AST lives in [`compile`], per-matcher tests in [`matching`].

pub mod anb;
pub mod combinator;
pub mod compile;
pub mod matching;

use std::fmt;
use std::sync::Arc;

use crate::css::model::AttributeOperator;
use crate::css::specificity::Spec;
use crate::dom::traits::DomTree;

pub use anb::{AnB, IndexResult, IndexSelector};
pub use combinator::Combinator;
pub use compile::{compile_group, compile_selector, CompileContext, CompileError, CompileErrors};
pub use matching::{PseudoClass, PseudoElement};

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// One atomic test against a single element.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// Tag name.
    Tag(String),
    /// `.class`
    Class(String),
    /// `#id`
    Id(String),
    /// `[name op value]`
    Attribute {
        name: String,
        op: AttributeOperator,
        value: String,
    },
    PseudoClass(PseudoClass),
    PseudoElement(PseudoElement),
    /// `:nth-child()` / `:nth-last-child()`.
    NthChild { from_end: bool, index: IndexSelector },
    /// `:nth-of-type()` / `:nth-last-of-type()`.
    NthOfType { from_end: bool, anb: AnB },
    /// `:is(...)`
    Is(SelectorGroup),
    /// `:not(...)`
    Not(SelectorGroup),
    /// `&`: the enclosing rule's selector group, tested on the same element.
    Scope(Arc<SelectorGroup>),
    /// Stand-in for a matcher that failed to compile; never matches. Keeps the
    /// source text for display.
    Never(String),
}

impl Matcher {
    /// This matcher's contribution to the selector's specificity.
    pub fn spec(&self) -> Spec {
        match self {
            Matcher::Id(_) => Spec::new(1, 0, 0),
            Matcher::Class(_)
            | Matcher::Attribute { .. }
            | Matcher::PseudoClass(_)
            | Matcher::NthChild { .. }
            | Matcher::NthOfType { .. }
            | Matcher::Is(_)
            | Matcher::Not(_) => Spec::new(0, 1, 0),
            Matcher::Tag(_) | Matcher::PseudoElement(_) => Spec::new(0, 0, 1),
            Matcher::Scope(group) => group.max_spec(),
            Matcher::Never(_) => Spec::ZERO,
        }
    }

    /// Whether the result can change when a sibling is added, removed or
    /// restyled.
    pub fn depends_on_siblings(&self) -> bool {
        match self {
            Matcher::PseudoClass(pseudo) => pseudo.is_positional(),
            Matcher::NthChild { .. } | Matcher::NthOfType { .. } => true,
            Matcher::Is(group) | Matcher::Not(group) => group.depends_on_siblings(),
            Matcher::Scope(group) => group.depends_on_siblings(),
            _ => false,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Tag(name) => f.write_str(name),
            Matcher::Class(name) => write!(f, ".{name}"),
            Matcher::Id(name) => write!(f, "#{name}"),
            Matcher::Attribute { name, op, value } => {
                write!(f, "[{name}")?;
                if *op != AttributeOperator::Has {
                    write!(f, "{}\"{value}\"", op.symbol())?;
                }
                f.write_str("]")
            }
            Matcher::PseudoClass(pseudo) => write!(f, ":{pseudo}"),
            Matcher::PseudoElement(pseudo) => write!(f, "::{pseudo}"),
            Matcher::NthChild { from_end, index } => {
                let name = if *from_end { "nth-last-child" } else { "nth-child" };
                write!(f, ":{name}({index})")
            }
            Matcher::NthOfType { from_end, anb } => {
                let name = if *from_end { "nth-last-of-type" } else { "nth-of-type" };
                write!(f, ":{name}({anb})")
            }
            Matcher::Is(group) => write!(f, ":is({group})"),
            Matcher::Not(group) => write!(f, ":not({group})"),
            Matcher::Scope(_) => f.write_str("&"),
            Matcher::Never(source) => f.write_str(source),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectorNode / Selector
// ---------------------------------------------------------------------------

/// A compound selector: every matcher must accept the element.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorNode {
    /// Relation to the node on the left; `None` for the first node.
    pub combinator: Option<Combinator>,
    pub matchers: Vec<Matcher>,
}

impl SelectorNode {
    pub fn new(combinator: Option<Combinator>, matchers: Vec<Matcher>) -> Self {
        Self {
            combinator,
            matchers,
        }
    }

    /// Test every matcher against `el`. A node without matchers is `*`.
    pub fn test<D: DomTree>(&self, dom: &D, root: Option<D::Node>, el: D::Node) -> bool {
        self.matchers.iter().all(|m| m.test(dom, root, el))
    }

    fn spec(&self) -> Spec {
        self.matchers
            .iter()
            .fold(Spec::ZERO, |acc, matcher| acc + matcher.spec())
    }
}

impl fmt::Display for SelectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matchers.is_empty() {
            return f.write_str("*");
        }
        for matcher in &self.matchers {
            write!(f, "{matcher}")?;
        }
        Ok(())
    }
}

/// A compiled complex selector with its specificity.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    nodes: Vec<SelectorNode>,
    spec: Spec,
}

impl Selector {
    /// Build a selector, computing its specificity once.
    pub fn new(nodes: Vec<SelectorNode>) -> Self {
        let spec = nodes
            .iter()
            .fold(Spec::ZERO, |acc, node| acc + node.spec());
        Self { nodes, spec }
    }

    pub fn nodes(&self) -> &[SelectorNode] {
        &self.nodes
    }

    pub fn spec(&self) -> Spec {
        self.spec
    }

    /// Whether `el` matches, walking no higher than `root` (when given).
    ///
    /// The last node is tested against `el`; each preceding node is then
    /// looked for through the combinator that links it to its successor.
    pub fn test<D: DomTree>(&self, dom: &D, root: Option<D::Node>, el: D::Node) -> bool {
        if !dom.is_element(el) {
            return false;
        }
        let Some((subject, rest)) = self.nodes.split_last() else {
            return false;
        };
        if !subject.test(dom, root, el) {
            return false;
        }

        let min_depth = root.map(|r| dom.depth(r));
        let mut current = el;
        let mut combinator = subject.combinator;

        for node in rest.iter().rev() {
            let Some(link) = combinator else {
                return false;
            };
            match link.find_next_matching(dom, min_depth, current, |candidate| {
                node.test(dom, root, candidate)
            }) {
                Some(next) => current = next,
                None => return false,
            }
            combinator = node.combinator;
        }

        true
    }

    /// Whether matching looks at sibling elements anywhere in the chain.
    pub fn depends_on_siblings(&self) -> bool {
        self.nodes.iter().any(|node| {
            node.combinator.is_some_and(Combinator::is_sibling)
                || node.matchers.iter().any(Matcher::depends_on_siblings)
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                if let Some(combinator) = node.combinator {
                    write!(f, "{combinator}")?;
                }
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SelectorGroup
// ---------------------------------------------------------------------------

/// A comma-separated list of selectors, tested as a logical OR.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorGroup {
    selectors: Vec<Selector>,
}

impl SelectorGroup {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Whether any selector in the group matches `el`.
    pub fn test<D: DomTree>(&self, dom: &D, root: Option<D::Node>, el: D::Node) -> bool {
        self.selectors.iter().any(|s| s.test(dom, root, el))
    }

    /// The highest specificity among the group's selectors.
    pub fn max_spec(&self) -> Spec {
        self.selectors
            .iter()
            .map(Selector::spec)
            .max()
            .unwrap_or_default()
    }

    pub fn depends_on_siblings(&self) -> bool {
        self.selectors.iter().any(Selector::depends_on_siblings)
    }
}

impl fmt::Display for SelectorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

impl From<Selector> for SelectorGroup {
    fn from(selector: Selector) -> Self {
        Self::new(vec![selector])
    }
}
