//! Structural combinators between compiled selector nodes.

use std::fmt;

use crate::dom::traits::DomTree;

/// How a selector node relates to the node on its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// `A B`: any ancestor.
    Descendant,
    /// `A > B`: the immediate parent.
    Child,
    /// `A + B`: the immediately preceding element sibling.
    AdjacentSibling,
    /// `A ~ B`: any preceding element sibling.
    GeneralSibling,
    /// `&B`: the same element again.
    Nest,
}

impl Combinator {
    /// Whether matching this combinator looks at siblings.
    pub fn is_sibling(self) -> bool {
        matches!(self, Combinator::AdjacentSibling | Combinator::GeneralSibling)
    }

    /// Find the element the left-hand node must be tested against.
    ///
    /// Returns the first candidate accepted by `test`. Candidates shallower
    /// than `min_depth` are never considered.
    pub(crate) fn find_next_matching<D: DomTree>(
        self,
        dom: &D,
        min_depth: Option<usize>,
        el: D::Node,
        mut test: impl FnMut(D::Node) -> bool,
    ) -> Option<D::Node> {
        let in_bounds = |node: D::Node| min_depth.map_or(true, |min| dom.depth(node) >= min);

        match self {
            Combinator::Descendant => {
                let mut current = dom.parent(el);
                while let Some(p) = current {
                    if !in_bounds(p) {
                        return None;
                    }
                    if dom.is_element(p) && test(p) {
                        return Some(p);
                    }
                    current = dom.parent(p);
                }
                None
            }
            Combinator::Child => dom
                .parent(el)
                .filter(|&p| in_bounds(p) && dom.is_element(p) && test(p)),
            Combinator::AdjacentSibling => dom
                .previous_element_sibling(el)
                .filter(|&s| in_bounds(s) && test(s)),
            Combinator::GeneralSibling => {
                let mut current = dom.previous_element_sibling(el);
                while let Some(s) = current {
                    if !in_bounds(s) {
                        return None;
                    }
                    if test(s) {
                        return Some(s);
                    }
                    current = dom.previous_element_sibling(s);
                }
                None
            }
            Combinator::Nest => test(el).then_some(el),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::Descendant => f.write_str(" "),
            Combinator::Child => f.write_str(" > "),
            Combinator::AdjacentSibling => f.write_str(" + "),
            Combinator::GeneralSibling => f.write_str(" ~ "),
            Combinator::Nest => Ok(()),
        }
    }
}

impl From<crate::css::model::Combinator> for Combinator {
    fn from(combinator: crate::css::model::Combinator) -> Self {
        use crate::css::model::Combinator as Ast;
        match combinator {
            Ast::Descendant => Combinator::Descendant,
            Ast::Child => Combinator::Child,
            Ast::AdjacentSibling => Combinator::AdjacentSibling,
            Ast::GeneralSibling => Combinator::GeneralSibling,
        }
    }
}
