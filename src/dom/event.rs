//! DOM mutation and interaction events.
//!
//! The [`Dom`](crate::dom::Dom) records an event for every structural,
//! attribute or interaction change and queues it until drained. The style
//! engine consumes these to keep its style tree in lockstep with the DOM.

use crate::dom::node::NodeId;

/// Interaction-state changes that can flip pseudo-class predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Pointer entered the element (`:hover` on).
    MouseEnter,
    /// Pointer left the element (`:hover` off).
    MouseLeave,
    /// Element pressed (`:active` on).
    Click,
    /// Click state expired (`:active` off).
    ClickExpire,
    /// Text input changed the element's content.
    Input,
}

/// A change to the observable tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent<N = NodeId> {
    /// `node` was attached under `parent` at `index`. A `None` parent means
    /// `node` became the document root.
    AppendChild {
        parent: Option<N>,
        node: N,
        index: usize,
    },
    /// `node` (and its subtree) was detached from `parent`.
    RemoveChild { parent: Option<N>, node: N },
    /// An attribute changed. `None` means absent.
    AttributeModified {
        element: N,
        key: String,
        old: Option<String>,
        new: Option<String>,
    },
    /// An interaction state changed on `element`.
    Interaction { element: N, kind: InteractionKind },
}

impl<N: Copy> DomEvent<N> {
    /// The node the event is about.
    pub fn target(&self) -> N {
        match self {
            DomEvent::AppendChild { node, .. } | DomEvent::RemoveChild { node, .. } => *node,
            DomEvent::AttributeModified { element, .. } | DomEvent::Interaction { element, .. } => {
                *element
            }
        }
    }
}
