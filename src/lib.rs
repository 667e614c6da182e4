//! # dot-fsm
//!
//! Compile Graphviz state diagrams into event-driven C++ state machines.
//!
//! Every node labelled with the `(ENTRY)` marker starts an independent
//! machine made of the states reachable from it. Edge labels name the events
//! that drive transitions: `GO` becomes `GO_EVENT`, `500(T2)` arms timer
//! `TIMER_2` for 500 ms, and an unlabelled edge is taken as soon as its state
//! is entered.
//!
//! ## Example
//!
//! ```rust
//! use dot_fsm::{GenConfig, compile};
//!
//! let dot = r#"digraph {
//!     idle [label="(ENTRY)Idle"];
//!     idle -> busy [label="start"];
//!     busy -> idle [label="1000(T1)"];
//! }"#;
//!
//! let artifacts = compile(dot, &GenConfig::default()).unwrap();
//! let machine = artifacts.get("Src/FSM1.cpp").unwrap();
//! assert!(machine.contents.contains("start_timer(TIMER_1, 1000);"));
//! ```

use std::path::{Path, PathBuf};

mod output;

#[doc(inline)]
pub use crate::output::write_output;
#[doc(inline)]
pub use dot_fsm_codegen::{Artifact, Artifacts, CodegenError, CodegenMode, GenConfig, generate};
#[doc(inline)]
pub use dot_fsm_core::{GraphError, OverlapPolicy, StateGraph};

/// Errors raised while compiling a diagram to disk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    #[error("{action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

/// Compiles DOT text into the full set of generated files, in memory.
pub fn compile(text: &str, config: &GenConfig) -> Result<Artifacts, Error> {
    let graph = dot_fsm_core::load(text)?;
    tracing::debug!(
        states = graph.node_count(),
        transitions = graph.edge_count(),
        "loaded state diagram"
    );
    Ok(generate(&graph, config)?)
}

/// Reads and compiles a DOT file, in memory.
pub fn compile_file(path: impl AsRef<Path>, config: &GenConfig) -> Result<Artifacts, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(Error::io("cannot read", path))?;
    compile(&text, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_reports_bad_label() {
        let err = compile(r#"digraph { A -> B [label="@bad"] }"#, &GenConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Graph(GraphError::InvalidEventLabel { .. })));
        assert!(err.to_string().contains("@bad"));
    }

    #[test]
    fn test_compile_file_missing() {
        let err = compile_file("/nonexistent/diagram.dot", &GenConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.to_string(), "cannot read /nonexistent/diagram.dot");
    }
}
