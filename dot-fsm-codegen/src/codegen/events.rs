use std::fmt::{self, Write as _};

use dot_fsm_core::{BASE_EVENT, EventCatalog};

use crate::config::GenConfig;
use crate::helpers::{HEADER_COMMENT, include_guard};

pub const EVENTS_HEADER: &str = "Events.hpp";

pub fn render_events_header(catalog: &EventCatalog, config: &GenConfig) -> Result<String, fmt::Error> {
    let guard = include_guard(EVENTS_HEADER);
    let mut out = String::new();

    writeln!(out, "{HEADER_COMMENT}")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "#include \"{}\"", super::RUNTIME_HEADER)?;
    writeln!(out)?;

    if config.timers_enabled() {
        render_timer_enum(&mut out, catalog)?;
        writeln!(out)?;
        writeln!(out, "/* Implement these functions in a user source file. */")?;
        writeln!(out, "void start_timer(Timer timer, int ms);")?;
        writeln!(out, "void stop_timer(Timer timer);")?;
        writeln!(out)?;
    }

    writeln!(out, "struct {BASE_EVENT} : tinyfsm::Event {{}};")?;
    writeln!(out)?;
    for event in catalog.events() {
        writeln!(out, "struct {event} : {BASE_EVENT} {{}};")?;
    }
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;

    Ok(out)
}

fn render_timer_enum(out: &mut String, catalog: &EventCatalog) -> fmt::Result {
    let mut count = 0usize;
    writeln!(out, "typedef enum {{")?;
    for (i, timer) in catalog.timers().enumerate() {
        writeln!(out, "    {} = {i},", timer.name())?;
        count += 1;
    }
    writeln!(out, "    NUM_TIMERS = {count}")?;
    writeln!(out, "}} Timer;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_fsm_core::load;

    fn catalog() -> EventCatalog {
        EventCatalog::build(
            &load(r#"digraph { A -> B [label="go"]; B -> A [label="500(T1)"] }"#).unwrap(),
        )
    }

    #[test]
    fn test_events_header_full() {
        let header = render_events_header(&catalog(), &GenConfig::default()).unwrap();
        assert!(header.starts_with(HEADER_COMMENT));
        assert!(header.contains("#ifndef EVENTS_HPP_\n#define EVENTS_HPP_\n"));
        assert!(header.contains("typedef enum {\n    TIMER_1 = 0,\n    NUM_TIMERS = 1\n} Timer;\n"));
        assert!(header.contains("void start_timer(Timer timer, int ms);\n"));
        assert!(header.contains("struct GO_EVENT : BASE_EVENT {};\n"));
        assert!(header.contains("struct TIMER_1_EVENT : BASE_EVENT {};\n"));
        assert!(header.trim_end().ends_with("#endif /* EVENTS_HPP_ */"));
    }

    #[test]
    fn test_events_header_stubs() {
        let header = render_events_header(&catalog(), &GenConfig::stubs()).unwrap();
        assert!(!header.contains("Timer"));
        assert!(!header.contains("start_timer"));
        assert!(header.contains("struct TIMER_1_EVENT : BASE_EVENT {};\n"));
    }
}
