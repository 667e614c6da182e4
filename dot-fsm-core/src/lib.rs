//! Graph model and analysis for dot-fsm.
//!
//! A state diagram is read from DOT ([`dot`]), turned into a [`StateGraph`]
//! with canonical events on every edge ([`event`]), split into independent
//! machines ([`partition`]) and summarized into the shared [`EventCatalog`].

pub mod catalog;
pub mod dot;
mod error;
pub mod event;
pub mod graph;
pub mod partition;

#[doc(inline)]
pub use crate::catalog::EventCatalog;
#[doc(inline)]
pub use crate::error::GraphError;
#[doc(inline)]
pub use crate::event::{BASE_EVENT, CanonicalEvent, TimerSpec, canonicalize};
#[doc(inline)]
pub use crate::graph::{ENTRY_MARKER, EdgeView, StateGraph, StateNode, Transition};
#[doc(inline)]
pub use crate::partition::{OverlapPolicy, Partition, entry_nodes, partitions};

pub use petgraph::graph::{EdgeIndex, NodeIndex};

/// Parses DOT text straight into a [`StateGraph`].
pub fn load(text: &str) -> Result<StateGraph, GraphError> {
    StateGraph::from_dot(&dot::parse(text)?)
}
