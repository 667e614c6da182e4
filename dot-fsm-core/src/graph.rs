//! The state graph: states as nodes, labeled transitions as (parallel) edges.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::GraphError;
use crate::dot::DotGraph;
use crate::event::{CanonicalEvent, canonicalize};

/// Label prefix marking a machine's initial state.
pub const ENTRY_MARKER: &str = "(ENTRY)";

/// A state of one of the machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNode {
    /// DOT node id; used verbatim in generated identifiers.
    pub id: String,
    /// Display label, defaulting to the id.
    pub label: String,
}

impl StateNode {
    pub fn is_entry(&self) -> bool {
        self.label.starts_with(ENTRY_MARKER)
    }
}

/// A labeled transition between two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Label text as written in the diagram.
    pub label: String,
    pub event: CanonicalEvent,
    /// Position among the edges sharing this ordered (source, target) pair.
    pub ordinal: usize,
}

/// Borrowed view of one edge with its endpoints resolved.
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    pub index: EdgeIndex,
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub transition: &'a Transition,
}

/// Directed multigraph of states.
///
/// Node indices follow first appearance in the diagram and edge indices follow
/// file order; every traversal here is expressed in those orders so generated
/// output is reproducible.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    graph: DiGraph<StateNode, Transition>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the state graph from a parsed diagram, canonicalizing every
    /// edge label.
    pub fn from_dot(dot: &DotGraph) -> Result<Self, GraphError> {
        if !dot.directed {
            tracing::warn!("undirected graph: edges are read in the order they are written");
        }

        let mut states = Self::new();
        let mut by_id = HashMap::with_capacity(dot.nodes.len());
        for node in &dot.nodes {
            let label = node.attr("label").unwrap_or(&node.id);
            let index = states.add_state(&node.id, label)?;
            by_id.insert(node.id.as_str(), index);
        }

        for edge in &dot.edges {
            // The reader creates a node for every edge endpoint.
            let (Some(&source), Some(&target)) =
                (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str()))
            else {
                continue;
            };
            states.add_transition(source, target, edge.attr("label").unwrap_or(""))?;
        }

        tracing::debug!(
            states = states.node_count(),
            transitions = states.edge_count(),
            "loaded state graph"
        );
        Ok(states)
    }

    /// Adds a state; its id must be usable inside a C++ identifier.
    pub fn add_state(&mut self, id: &str, label: &str) -> Result<NodeIndex, GraphError> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(GraphError::InvalidStateName {
                node: id.to_string(),
            });
        }
        Ok(self.graph.add_node(StateNode {
            id: id.to_string(),
            label: label.to_string(),
        }))
    }

    /// Adds a transition after canonicalizing its label.
    pub fn add_transition(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        label: &str,
    ) -> Result<EdgeIndex, GraphError> {
        let event = canonicalize(label)
            .map_err(|e| e.on_edge(&self.graph[source].id, &self.graph[target].id))?;
        let ordinal = self.graph.edges_connecting(source, target).count();
        Ok(self.graph.add_edge(
            source,
            target,
            Transition {
                label: label.to_string(),
                event,
                ordinal,
            },
        ))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn state(&self, index: NodeIndex) -> &StateNode {
        &self.graph[index]
    }

    /// Looks a state up by its DOT id.
    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&index| self.graph[index].id == id)
    }

    /// All states in diagram order.
    pub fn states(&self) -> impl Iterator<Item = (NodeIndex, &StateNode)> + '_ {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    /// All transitions in file order.
    pub fn transitions(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.graph.edge_indices().filter_map(move |index| {
            let (source, target) = self.graph.edge_endpoints(index)?;
            Some(EdgeView {
                index,
                source,
                target,
                transition: &self.graph[index],
            })
        })
    }

    /// Outgoing transitions of `node` in file order.
    ///
    /// petgraph walks adjacency lists newest-first, so the edges are sorted
    /// back into insertion order here.
    pub fn outgoing(&self, node: NodeIndex) -> Vec<EdgeView<'_>> {
        let mut edges: Vec<EdgeView<'_>> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| EdgeView {
                index: edge.id(),
                source: edge.source(),
                target: edge.target(),
                transition: edge.weight(),
            })
            .collect();
        edges.sort_by_key(|edge| edge.index);
        edges
    }

    /// Access to the underlying petgraph graph for traversals.
    pub fn inner(&self) -> &DiGraph<StateNode, Transition> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dot;

    fn load(text: &str) -> StateGraph {
        StateGraph::from_dot(&dot::parse(text).unwrap()).unwrap()
    }

    #[test]
    fn test_labels_default_to_id() {
        let graph = load(r#"digraph { A [label="(ENTRY)Start"]; A -> B }"#);
        let a = graph.find("A").unwrap();
        let b = graph.find("B").unwrap();
        assert!(graph.state(a).is_entry());
        assert_eq!(graph.state(b).label, "B");
        assert!(!graph.state(b).is_entry());
    }

    #[test]
    fn test_outgoing_preserves_file_order_and_ordinals() {
        let graph = load(
            r#"digraph {
                A -> B [label="X"];
                A -> C [label="Z"];
                A -> B [label="Y"];
            }"#,
        );
        let a = graph.find("A").unwrap();
        let out = graph.outgoing(a);
        let seen: Vec<_> = out
            .iter()
            .map(|e| {
                (
                    graph.state(e.target).id.as_str(),
                    e.transition.label.as_str(),
                    e.transition.ordinal,
                )
            })
            .collect();
        assert_eq!(seen, [("B", "X", 0), ("C", "Z", 0), ("B", "Y", 1)]);
    }

    #[test]
    fn test_invalid_label_names_edge() {
        let err = StateGraph::from_dot(
            &dot::parse(r#"digraph { A -> B [label="@bad"] }"#).unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidEventLabel {
                label: "@bad".to_string(),
                source_node: "A".to_string(),
                target_node: "B".to_string(),
            }
        );
        assert!(err.to_string().contains("@bad"));
    }

    #[test]
    fn test_state_ids_must_be_identifiers() {
        let err = StateGraph::from_dot(&dot::parse(r#"digraph { "my state" -> B }"#).unwrap())
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidStateName { node } if node == "my state"));
    }
}
