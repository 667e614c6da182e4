//! Entry discovery and splitting of the state graph into independent machines.

use std::collections::HashSet;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::Bfs;

use crate::GraphError;
use crate::graph::StateGraph;

/// What to do when two entry nodes reach a common state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Fail with [`GraphError::OverlappingPartitions`].
    #[default]
    Reject,
    /// Generate shared states once per machine.
    Duplicate,
}

/// One independent machine: everything reachable from a single entry node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// 1-based machine number, following entry order.
    pub number: usize,
    pub entry: NodeIndex,
    /// States in breadth-first visiting order, starting with the entry.
    pub bfs_order: Vec<NodeIndex>,
    /// States in diagram order.
    pub nodes: Vec<NodeIndex>,
    /// Edges with both endpoints inside the partition, in file order.
    pub edges: Vec<EdgeIndex>,
}

impl Partition {
    /// Machine type name, e.g. `FSM1`.
    pub fn name(&self) -> String {
        format!("FSM{}", self.number)
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.nodes.binary_search(&node).is_ok()
    }
}

/// Nodes whose label starts with the entry marker, in diagram order.
pub fn entry_nodes(graph: &StateGraph) -> Vec<NodeIndex> {
    graph
        .states()
        .filter(|(_, state)| state.is_entry())
        .map(|(index, _)| index)
        .collect()
}

/// Computes the partition induced by a single entry node.
pub fn closure(graph: &StateGraph, number: usize, entry: NodeIndex) -> Partition {
    let mut bfs = Bfs::new(graph.inner(), entry);
    let mut bfs_order = Vec::new();
    while let Some(node) = bfs.next(graph.inner()) {
        bfs_order.push(node);
    }

    let mut nodes = bfs_order.clone();
    nodes.sort();

    let member: HashSet<NodeIndex> = nodes.iter().copied().collect();
    let edges = graph
        .transitions()
        .filter(|edge| member.contains(&edge.source) && member.contains(&edge.target))
        .map(|edge| edge.index)
        .collect();

    Partition {
        number,
        entry,
        bfs_order,
        nodes,
        edges,
    }
}

/// Splits the graph into one partition per entry node.
pub fn partitions(graph: &StateGraph, policy: OverlapPolicy) -> Result<Vec<Partition>, GraphError> {
    let parts: Vec<Partition> = entry_nodes(graph)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| closure(graph, i + 1, entry))
        .collect();

    for (i, first) in parts.iter().enumerate() {
        for second in &parts[i + 1..] {
            let Some(&shared) = first.nodes.iter().find(|&&n| second.contains(n)) else {
                continue;
            };
            match policy {
                OverlapPolicy::Reject => {
                    return Err(GraphError::OverlappingPartitions {
                        first: first.name(),
                        second: second.name(),
                        node: graph.state(shared).id.clone(),
                    });
                }
                OverlapPolicy::Duplicate => tracing::warn!(
                    first = %first.name(),
                    second = %second.name(),
                    state = %graph.state(shared).id,
                    "machines overlap; shared states are generated in both"
                ),
            }
        }
    }

    for part in &parts {
        tracing::debug!(
            machine = %part.name(),
            entry = %graph.state(part.entry).id,
            states = part.nodes.len(),
            transitions = part.edges.len(),
            "resolved machine"
        );
    }
    Ok(parts)
}
