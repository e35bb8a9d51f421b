//! The observable document tree: slotmap-backed nodes, mutation events and
//! scoped selector queries.

pub mod event;
pub mod node;
pub mod query;
pub mod traits;
pub mod tree;

pub use event::{DomEvent, InteractionKind};
pub use node::{NodeData, NodeId, NodeKind};
pub use traits::DomTree;
pub use tree::{Dom, DomError};
