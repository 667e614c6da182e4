use std::fmt::{self, Write as _};

use dot_fsm_core::EventCatalog;

use crate::config::GenConfig;
use crate::helpers::{HEADER_COMMENT, comment_text, include_guard};
use crate::ir::{MachineIr, StateIr};
use crate::logic;

pub fn header_name(machine: &MachineIr) -> String {
    format!("{}.hpp", machine.name)
}

pub fn source_name(machine: &MachineIr) -> String {
    format!("{}.cpp", machine.name)
}

/// Renders the machine base class.
///
/// Every catalog event gets a no-op virtual reaction, not only the events this
/// machine uses, so the broadcast driver can dispatch any event to any machine.
pub fn render_machine_header(machine: &MachineIr, catalog: &EventCatalog) -> Result<String, fmt::Error> {
    let name = &machine.name;
    let guard = include_guard(&header_name(machine));
    let mut out = String::new();

    writeln!(out, "{HEADER_COMMENT}")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "#include \"{}\"", super::events::EVENTS_HEADER)?;
    writeln!(out, "#include \"{}\"", super::RUNTIME_HEADER)?;
    writeln!(out, "#include \"{}\"", super::user_states::USER_STATES_HEADER)?;
    writeln!(out)?;

    writeln!(out, "class {name} : public tinyfsm::Fsm<{name}> {{")?;
    writeln!(out, "public:")?;
    writeln!(out, "    void react(tinyfsm::Event const &) {{}}")?;
    writeln!(out, "    virtual void entry(void) {{}}")?;
    writeln!(out, "    virtual void exit(void) {{}}")?;
    writeln!(out)?;
    for event in catalog.events() {
        writeln!(out, "    virtual void react({event} const &) {{}}")?;
    }
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;

    Ok(out)
}

/// Renders one class per state and binds the initial state.
pub fn render_machine_source(machine: &MachineIr, config: &GenConfig) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "{HEADER_COMMENT}")?;
    writeln!(out)?;
    writeln!(out, "#include \"{}\"", header_name(machine))?;
    writeln!(out)?;

    for state in &machine.states {
        writeln!(out, "class {};    /* {} */", state.class_name, comment_text(&state.label))?;
    }
    writeln!(out)?;

    for state in &machine.states {
        render_state(&mut out, machine, state, config)?;
        writeln!(out)?;
    }

    writeln!(
        out,
        "FSM_INITIAL_STATE({}, {});",
        machine.name, machine.initial_state
    )?;

    Ok(out)
}

fn render_state(out: &mut String, machine: &MachineIr, state: &StateIr, config: &GenConfig) -> fmt::Result {
    writeln!(out, "class {} : public {} {{", state.class_name, machine.name)?;

    writeln!(out, "    void entry() override {{")?;
    for action in logic::entry_actions(state, config) {
        writeln!(out, "        {action}")?;
    }
    writeln!(out, "    }}")?;

    for reaction in &state.reactions {
        writeln!(out)?;
        writeln!(out, "    void react({} const &) override {{", reaction.event)?;
        for statement in logic::reaction_body(state, reaction, config) {
            writeln!(out, "        {statement}")?;
        }
        writeln!(out, "    }}")?;
    }

    writeln!(out, "}};")
}
