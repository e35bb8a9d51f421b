//! # chimera-style
//!
//! Style resolution for Chimera documents: compiled selectors, a specificity
//! ordered cascade, and a style tree kept in step with an observable DOM.
//!
//! ## Core Systems
//!
//! - **[`css`]**: Values, the property registry, property sets, selectors
//!   (combinators, `An+B`, pseudo-classes), specificity and compiled stylesheets
//! - **[`dom`]**: Slotmap-backed document tree emitting mutation events, plus
//!   scoped selector queries
//! - **[`style`]**: Style tree, cascade and keyword resolution, and the
//!   incremental [`StyleEngine`] with change subscriptions
//! - **[`document`]**: A DOM and engine wired together so every mutation is
//!   restyled before the call returns

// Styling language
pub mod css;

// Document tree
pub mod dom;

// Resolution
pub mod document;
pub mod style;

pub use css::{Property, PropertyId, PropertySet, Rule, Spec, Stylesheet, Value, ValueKind};
pub use document::{Document, DocumentError};
pub use dom::{Dom, DomError, DomEvent, DomTree, NodeData, NodeId};
pub use style::{ComputedStyle, EngineConfig, StyleEngine, StyleTreeError, StyleUpdate};
