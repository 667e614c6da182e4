use std::fmt::{self, Write as _};

use dot_fsm_core::StateGraph;

use crate::config::GenConfig;
use crate::helpers::{HEADER_COMMENT, comment_text, hook_prototype, include_guard};

pub const USER_STATES_HEADER: &str = "user_states.hpp";
pub const USER_STATES_SOURCE: &str = "user_states.cpp";

/// Prototypes for every state hook in the diagram.
pub fn render_user_states_header(graph: &StateGraph, config: &GenConfig) -> Result<String, fmt::Error> {
    let guard = include_guard(USER_STATES_HEADER);
    let mut out = String::new();

    writeln!(out, "{HEADER_COMMENT}")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    if let Some(ref platform) = config.platform_header {
        writeln!(out, "#include \"{platform}\"")?;
    }
    writeln!(out, "#include \"{}\"", super::events::EVENTS_HEADER)?;
    writeln!(out, "#include \"{}\"", super::fifo::FIFO_HEADER)?;
    writeln!(out)?;
    for (_, state) in graph.states() {
        writeln!(out, "{};", hook_prototype(&state.id))?;
    }
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;

    Ok(out)
}

/// Empty hook bodies for the user to fill in.
pub fn render_user_states_source(graph: &StateGraph) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "#include \"{USER_STATES_HEADER}\"")?;
    for (_, state) in graph.states() {
        writeln!(out)?;
        writeln!(out, "/* {} */", comment_text(&state.label))?;
        writeln!(out, "{} {{", hook_prototype(&state.id))?;
        writeln!(out, "    // TODO")?;
        writeln!(out, "}}")?;
    }

    Ok(out)
}
