//! Chimera styling language: values, properties, selectors, stylesheets.
//!
//! Stylesheet source text is parsed elsewhere; this module starts from the
//! parsed [`model`] and compiles it into matchable [`stylesheet::Rule`]s.
//! Inline style attributes are read by [`declaration`].

pub mod declaration;
pub mod model;
pub mod property;
pub mod property_set;
pub mod scalar;
pub mod selector;
pub mod specificity;
pub mod stylesheet;
pub mod value;

pub use declaration::{parse_declarations, DeclarationError};
pub use property::{Property, PropertyId, PropertyValue};
pub use property_set::PropertySet;
pub use specificity::Spec;
pub use stylesheet::{Rule, Stylesheet, StylesheetBuilder};
pub use value::{Value, ValueKind};
