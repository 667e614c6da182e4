use std::fmt::{self, Write as _};

use dot_fsm_core::EventCatalog;

use crate::helpers::{HEADER_COMMENT, event_index, event_singleton, include_guard};
use crate::ir::MachineIr;

pub const DRIVER_HEADER: &str = "fsm_driver.hpp";
pub const DRIVER_SOURCE: &str = "fsm_driver.cpp";

pub fn render_driver_header() -> Result<String, fmt::Error> {
    let guard = include_guard(DRIVER_HEADER);
    let mut out = String::new();

    writeln!(out, "{HEADER_COMMENT}")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "void start_fsm_driver();")?;
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;

    Ok(out)
}

/// Renders the top-level loop: start every machine, then drain the FIFO
/// forever, broadcasting each event to all machines.
pub fn render_driver_source(catalog: &EventCatalog, machines: &[MachineIr]) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "{HEADER_COMMENT}")?;
    writeln!(out)?;
    writeln!(out, "#include \"{DRIVER_HEADER}\"")?;
    writeln!(out, "#include \"{}\"", super::events::EVENTS_HEADER)?;
    writeln!(out, "#include \"{}\"", super::fifo::FIFO_HEADER)?;
    writeln!(out, "#include \"{}\"", super::RUNTIME_HEADER)?;
    for machine in machines {
        writeln!(out, "#include \"{}.hpp\"", machine.name)?;
    }
    writeln!(out)?;

    let names: Vec<&str> = machines.iter().map(|m| m.name.as_str()).collect();
    writeln!(out, "using my_fsm = tinyfsm::FsmList<{}>;", names.join(", "))?;
    writeln!(out)?;

    for event in catalog.events() {
        writeln!(out, "{event} {} = {event}();", event_singleton(event))?;
    }
    writeln!(out)?;

    writeln!(out, "void start_fsm_driver() {{")?;
    writeln!(out, "    FSM_Event event;")?;
    writeln!(out)?;
    writeln!(out, "    my_fsm::start();")?;
    writeln!(out)?;
    writeln!(out, "    while (1) {{")?;
    writeln!(out, "        if (read_event(&event)) {{")?;
    writeln!(out, "            switch (event) {{")?;
    for event in catalog.events() {
        writeln!(
            out,
            "            case {}: my_fsm::dispatch({}); break;",
            event_index(event),
            event_singleton(event)
        )?;
    }
    writeln!(out, "            }}")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}
