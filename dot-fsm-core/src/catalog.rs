//! The graph-wide event catalog shared by every machine and the event queue.

use indexmap::{IndexMap, IndexSet};

use crate::event::{CanonicalEvent, TimerSpec};
use crate::graph::StateGraph;

/// Deduplicated events of the whole graph, in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCatalog {
    events: IndexSet<String>,
    timers: IndexMap<String, TimerSpec>,
}

impl EventCatalog {
    /// Collects the event of every edge, walking edges in file order.
    ///
    /// Unconditional transitions are not events and are left out.
    pub fn build(graph: &StateGraph) -> Self {
        let mut catalog = Self::default();
        for edge in graph.transitions() {
            catalog.insert(&edge.transition.event);
        }
        tracing::debug!(
            events = catalog.events.len(),
            timers = catalog.timers.len(),
            "built event catalog"
        );
        catalog
    }

    pub fn insert(&mut self, event: &CanonicalEvent) {
        if let Some(ident) = event.ident() {
            self.events.insert(ident);
        }
        if let Some(timer) = event.timer() {
            self.timers.entry(timer.id.clone()).or_insert_with(|| timer.clone());
        }
    }

    /// Event type names, e.g. `GO_EVENT`, `TIMER_1_EVENT`.
    pub fn events(&self) -> impl Iterator<Item = &str> + '_ {
        self.events.iter().map(String::as_str)
    }

    /// Distinct timers, first discovery wins for the recorded period.
    pub fn timers(&self) -> impl Iterator<Item = &TimerSpec> + '_ {
        self.timers.values()
    }

    /// Event names backed by a timer.
    pub fn timer_events(&self) -> impl Iterator<Item = String> + '_ {
        self.timers.keys().map(|id| format!("TIMER_{id}_EVENT"))
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.events.contains(ident)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
