//! Style resolution: the style tree mirroring the DOM, the cascade, and the
//! engine that keeps both current as the DOM changes.

pub mod cascade;
pub mod computed;
pub mod config;
pub mod engine;
pub mod inline;
pub mod tree;

pub use cascade::Cascade;
pub use computed::{ComputedStyle, TextFlags};
pub use config::EngineConfig;
pub use engine::{SheetId, StyleEngine, StyleUpdate, SubscriptionId};
pub use inline::{DeclarationParser, InlineStyle, InlineStyleParser};
pub use tree::{ElementBlock, StyleKey, StyleNode, StyleTree, StyleTreeError};
