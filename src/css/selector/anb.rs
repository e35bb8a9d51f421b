//! `An+B` index patterns and the `nth-child` family's index selectors.

use std::fmt;

use crate::css::selector::SelectorGroup;
use crate::dom::traits::DomTree;

/// The CSS `An+B` pattern.
///
/// Matches a 1-based index `i` when `i = a*n + b` for some integer `n >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnB {
    pub a: i32,
    pub b: i32,
}

impl AnB {
    /// `even`, i.e. `2n`.
    pub const EVEN: AnB = AnB::new(2, 0);
    /// `odd`, i.e. `2n+1`.
    pub const ODD: AnB = AnB::new(2, 1);

    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Whether the 1-based `index` is selected by this pattern.
    pub fn index_matches(&self, index: i32) -> bool {
        if index < 1 {
            return false;
        }
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        let i = i64::from(index);

        match a {
            0 => i == b,
            a if a > 0 => i >= b && (i - b) % a == 0,
            a => i <= b && (b - i) % -a == 0,
        }
    }

    /// `false` when no positive index can ever match.
    pub fn can_match(&self) -> bool {
        self.a > 0 || self.b > 0
    }
}

impl fmt::Display for AnB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, 0) => write!(f, "{a}n"),
            (a, b) if b > 0 => write!(f, "{a}n+{b}"),
            (a, b) => write!(f, "{a}n{b}"),
        }
    }
}

/// Position of an element among its parent's element children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexResult {
    /// 1-based index among the siblings accepted by the predicate, if the
    /// element itself was accepted.
    pub index: Option<i32>,
    /// Number of accepted siblings (including the element).
    pub count: i32,
}

impl IndexResult {
    /// Count element siblings of `el` accepted by `accept`, from the start
    /// (or from the end when `from_end`).
    pub fn of<D: DomTree>(
        dom: &D,
        el: D::Node,
        from_end: bool,
        mut accept: impl FnMut(D::Node) -> bool,
    ) -> IndexResult {
        let Some(parent) = dom.parent(el) else {
            return IndexResult {
                index: None,
                count: 0,
            };
        };

        let children = dom.children(parent);
        let mut index = None;
        let mut count = 0;

        let mut visit = |node: D::Node| {
            if !dom.is_element(node) || !accept(node) {
                return;
            }
            count += 1;
            if node == el {
                index = Some(count);
            }
        };

        if from_end {
            children.iter().rev().copied().for_each(&mut visit);
        } else {
            children.iter().copied().for_each(&mut visit);
        }

        IndexResult { index, count }
    }
}

/// The argument of `nth-child` / `nth-last-child`.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexSelector {
    /// `An+B`: position among all element siblings.
    Simple(AnB),
    /// `An+B of S`: the element must match `S`, and only siblings matching `S`
    /// are counted.
    Grouped(AnB, SelectorGroup),
}

impl IndexSelector {
    pub fn anb(&self) -> AnB {
        match self {
            IndexSelector::Simple(anb) | IndexSelector::Grouped(anb, _) => *anb,
        }
    }

    pub(crate) fn test<D: DomTree>(
        &self,
        dom: &D,
        root: Option<D::Node>,
        el: D::Node,
        from_end: bool,
    ) -> bool {
        let result = match self {
            IndexSelector::Simple(_) => IndexResult::of(dom, el, from_end, |_| true),
            IndexSelector::Grouped(_, group) => {
                if !group.test(dom, root, el) {
                    return false;
                }
                IndexResult::of(dom, el, from_end, |n| group.test(dom, root, n))
            }
        };

        result
            .index
            .is_some_and(|index| self.anb().index_matches(index))
    }
}

impl fmt::Display for IndexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSelector::Simple(anb) => write!(f, "{anb}"),
            IndexSelector::Grouped(anb, group) => write!(f, "{anb} of {group}"),
        }
    }
}
