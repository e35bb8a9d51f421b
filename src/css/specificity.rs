//! 3-tuple selector specificity.
//!
//! Specificity decides which rule wins when several rules match the same
//! element. The tuple is:
//!
//! ```text
//! (id_column, class_column, type_column)
//! ```
//!
//! Fields are ordered so that the derived `Ord` (lexicographic) gives the
//! cascade order: more ids beat any number of classes, more classes beat any
//! number of type selectors. Source order is not part of `Spec`; it is the
//! second key of [`crate::css::stylesheet::Rule`]'s ordering.

use std::fmt;
use std::ops::{Add, AddAssign};

/// Selector specificity, ordered from highest to lowest priority column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Spec {
    /// Number of `#id` matchers.
    pub id_column: u32,
    /// Number of class, attribute, pseudo-class and pseudo-function matchers.
    pub class_column: u32,
    /// Number of tag-name and pseudo-element matchers.
    pub type_column: u32,
}

impl Spec {
    /// The zero specificity (`*`).
    pub const ZERO: Spec = Spec::new(0, 0, 0);

    /// Create a specificity from its three columns.
    pub const fn new(id_column: u32, class_column: u32, type_column: u32) -> Self {
        Self {
            id_column,
            class_column,
            type_column,
        }
    }

    /// Add every column of `other` to this specificity.
    pub fn append(&mut self, other: Spec) {
        self.id_column += other.id_column;
        self.class_column += other.class_column;
        self.type_column += other.type_column;
    }
}

impl Add for Spec {
    type Output = Spec;

    fn add(mut self, rhs: Spec) -> Spec {
        self.append(rhs);
        self
    }
}

impl AddAssign for Spec {
    fn add_assign(&mut self, rhs: Spec) {
        self.append(rhs);
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.id_column, self.class_column, self.type_column
        )
    }
}
