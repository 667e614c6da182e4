use dot_fsm_core::{CanonicalEvent, NodeIndex, Partition, StateGraph, TimerSpec};

use crate::helpers;

/// Intermediate representation of one machine.
/// This structure contains all the semantic decisions needed to generate code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineIr {
    /// Machine type name, e.g. `FSM1`.
    pub name: String,
    /// State class bound by `FSM_INITIAL_STATE`.
    pub initial_state: String,
    /// States in diagram order.
    pub states: Vec<StateIr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateIr {
    pub node: NodeIndex,
    pub class_name: String,
    pub hook: String,
    pub label: String,
    /// Timers armed on entry, one per timer id, in discovery order.
    pub timers: Vec<TimerSpec>,
    /// Target class when the state's only exit is unconditional.
    pub auto_transition: Option<String>,
    /// Event-driven exits in edge order.
    pub reactions: Vec<ReactionIr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionIr {
    pub event: String,
    pub target: String,
}

impl MachineIr {
    pub fn new(graph: &StateGraph, partition: &Partition) -> Self {
        let name = partition.name();
        let initial_state = helpers::state_class(&name, &graph.state(partition.entry).id);
        let states = partition
            .nodes
            .iter()
            .map(|&node| StateIr::new(graph, &name, node))
            .collect();

        Self {
            name,
            initial_state,
            states,
        }
    }

    pub fn state(&self, class_name: &str) -> Option<&StateIr> {
        self.states.iter().find(|s| s.class_name == class_name)
    }
}

impl StateIr {
    fn new(graph: &StateGraph, machine: &str, node: NodeIndex) -> Self {
        let state = graph.state(node);
        let outgoing = graph.outgoing(node);
        let target_class = |target: NodeIndex| helpers::state_class(machine, &graph.state(target).id);

        // Semantic decision: one start/stop per timer id; the first label wins.
        let mut timers: Vec<TimerSpec> = Vec::new();
        for edge in &outgoing {
            let Some(timer) = edge.transition.event.timer() else {
                continue;
            };
            match timers.iter().find(|t| t.id == timer.id) {
                None => timers.push(timer.clone()),
                Some(armed) if armed.period != timer.period => tracing::warn!(
                    state = %state.id,
                    timer = %timer.name(),
                    kept = %humantime::format_duration(armed.period),
                    ignored = %humantime::format_duration(timer.period),
                    "timer armed with two periods"
                ),
                Some(_) => {}
            }
        }

        // Semantic decision: a sole unconditional exit is taken on entry.
        let auto_transition = match outgoing.as_slice() {
            [only] if only.transition.event.is_unconditional() => Some(target_class(only.target)),
            _ => None,
        };

        let mut reactions: Vec<ReactionIr> = Vec::new();
        for edge in &outgoing {
            let event = match &edge.transition.event {
                CanonicalEvent::Unconditional => {
                    if auto_transition.is_none() {
                        tracing::warn!(
                            state = %state.id,
                            target = %graph.state(edge.target).id,
                            "unconditional transition is not the only exit and is never taken"
                        );
                    }
                    continue;
                }
                event => event.to_string(),
            };

            // Semantic decision: C++ allows one override per event; first edge wins.
            if let Some(existing) = reactions.iter().find(|r| r.event == event) {
                tracing::warn!(
                    state = %state.id,
                    event = %event,
                    kept = %existing.target,
                    ignored = %target_class(edge.target),
                    "ambiguous transitions on the same event"
                );
                continue;
            }

            reactions.push(ReactionIr {
                event,
                target: target_class(edge.target),
            });
        }

        for timer in &timers {
            tracing::trace!(
                state = %state.id,
                timer = %timer.name(),
                period = %humantime::format_duration(timer.period),
                "timer armed on entry"
            );
        }

        Self {
            node,
            class_name: target_class(node),
            hook: helpers::hook_name(&state.id),
            label: state.label.clone(),
            timers,
            auto_transition,
            reactions,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.reactions.is_empty() && self.auto_transition.is_none()
    }
}
