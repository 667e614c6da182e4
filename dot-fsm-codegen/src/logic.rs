use crate::config::GenConfig;
use crate::ir::{ReactionIr, StateIr};

/// Builds the statements of a state's `entry()` body.
/// Timers are armed first, then the user hook runs, and a sole unconditional
/// exit is taken last so the state never waits for an event.
pub fn entry_actions(state: &StateIr, config: &GenConfig) -> Vec<String> {
    let mut actions = Vec::new();

    if config.timers_enabled() {
        for timer in &state.timers {
            actions.push(format!("start_timer({}, {});", timer.name(), timer.millis()));
        }
    }

    actions.push(format!("{}();", state.hook));

    if let Some(ref target) = state.auto_transition {
        actions.push(format!("transit<{target}>();"));
    }

    actions
}

/// Builds the statements of one `react()` override: every timer armed on
/// entry is stopped before leaving the state.
pub fn reaction_body(state: &StateIr, reaction: &ReactionIr, config: &GenConfig) -> Vec<String> {
    let mut body = Vec::new();

    if config.timers_enabled() {
        for timer in &state.timers {
            body.push(format!("stop_timer({});", timer.name()));
        }
    }

    body.push(format!("transit<{}>();", reaction.target));
    body
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dot_fsm_core::{NodeIndex, TimerSpec};

    use super::*;

    fn timed_state() -> StateIr {
        StateIr {
            node: NodeIndex::new(0),
            class_name: "FSM1_A".into(),
            hook: "state_A".into(),
            label: "(ENTRY)A".into(),
            timers: vec![TimerSpec {
                id: "1".into(),
                period: Duration::from_millis(500),
            }],
            auto_transition: None,
            reactions: vec![ReactionIr {
                event: "GO_EVENT".into(),
                target: "FSM1_B".into(),
            }],
        }
    }

    #[test]
    fn test_entry_arms_timers_before_hook() {
        let state = timed_state();
        assert_eq!(
            entry_actions(&state, &GenConfig::default()),
            ["start_timer(TIMER_1, 500);", "state_A();"]
        );
    }

    #[test]
    fn test_reaction_stops_timers_before_transit() {
        let state = timed_state();
        assert_eq!(
            reaction_body(&state, &state.reactions[0], &GenConfig::default()),
            ["stop_timer(TIMER_1);", "transit<FSM1_B>();"]
        );
    }

    #[test]
    fn test_stub_mode_drops_timer_calls() {
        let state = timed_state();
        let config = GenConfig::stubs();
        assert_eq!(entry_actions(&state, &config), ["state_A();"]);
        assert_eq!(
            reaction_body(&state, &state.reactions[0], &config),
            ["transit<FSM1_B>();"]
        );
    }

    #[test]
    fn test_auto_transition_is_last() {
        let mut state = timed_state();
        state.timers.clear();
        state.reactions.clear();
        state.auto_transition = Some("FSM1_B".into());
        assert_eq!(
            entry_actions(&state, &GenConfig::default()),
            ["state_A();", "transit<FSM1_B>();"]
        );
    }
}
