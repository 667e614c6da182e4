//! C++ code generation for dot-fsm.
//!
//! Turns an analyzed [`StateGraph`](dot_fsm_core::StateGraph) into the source
//! tree of a tinyfsm-style event-driven program: the shared event catalog, the
//! event FIFO, the dispatch driver, user hook stubs and one class hierarchy per
//! machine.

use std::path::PathBuf;

use dot_fsm_core::GraphError;

mod codegen;
mod config;
mod helpers;
mod ir;
mod logic;

pub use crate::codegen::{
    Artifact, Artifacts, DRIVER_HEADER, DRIVER_SOURCE, EVENTS_HEADER, FIFO_HEADER, FIFO_SOURCE,
    INC_DIR, RUNTIME_HEADER, SRC_DIR, USER_STATES_HEADER, USER_STATES_SOURCE, generate,
};
pub use crate::config::{CodegenMode, GenConfig, MIN_FIFO_CAPACITY};
pub use crate::ir::{MachineIr, ReactionIr, StateIr};

/// Errors raised while generating the output tree.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("fifo capacity must be at least {MIN_FIFO_CAPACITY}, got {0}")]
    FifoCapacity(usize),
    #[error("cannot read runtime header {}", path.display())]
    RuntimeHeader {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to format generated source")]
    Format(#[from] std::fmt::Error),
}
