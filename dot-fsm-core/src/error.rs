//! Error types for graph loading and analysis.

/// Errors raised while reading a state diagram or deriving machines from it.
///
/// Every variant is fatal for a compilation run: the caller is expected to
/// report it and stop before writing any output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The DOT text could not be parsed.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    /// An edge label is neither empty, a timer (`500(T1)`) nor an identifier.
    #[error("invalid event label `{label}` on edge {source_node} -> {target_node}")]
    InvalidEventLabel {
        label: String,
        source_node: String,
        target_node: String,
    },
    /// A label was rejected before it could be attached to an edge.
    #[error("invalid event label `{label}`: {reason}")]
    MalformedLabel { label: String, reason: String },
    /// A node id cannot be used inside a generated C++ identifier.
    #[error("state `{node}` cannot be used as a C++ identifier (expected [A-Za-z0-9_]+)")]
    InvalidStateName { node: String },
    /// Two entry nodes reach a common state.
    #[error("machines {first} and {second} both reach state `{node}`")]
    OverlappingPartitions {
        first: String,
        second: String,
        node: String,
    },
}

impl GraphError {
    /// Attaches edge endpoints to a label error produced by the event namer.
    pub(crate) fn on_edge(self, source: &str, target: &str) -> Self {
        match self {
            GraphError::MalformedLabel { label, .. } => GraphError::InvalidEventLabel {
                label,
                source_node: source.to_string(),
                target_node: target.to_string(),
            },
            other => other,
        }
    }
}
