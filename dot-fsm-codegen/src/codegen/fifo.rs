use std::fmt::{self, Write as _};

use dot_fsm_core::EventCatalog;

use crate::config::GenConfig;
use crate::helpers::{HEADER_COMMENT, event_index, include_guard};

pub const FIFO_HEADER: &str = "fsm_fifo.hpp";
pub const FIFO_SOURCE: &str = "fsm_fifo.cpp";

/// Declares the serialized event tags and the ring buffer.
pub fn render_fifo_header(catalog: &EventCatalog, config: &GenConfig) -> Result<String, fmt::Error> {
    let guard = include_guard(FIFO_HEADER);
    let mut out = String::new();

    writeln!(out, "{HEADER_COMMENT}")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "#include \"{}\"", super::events::EVENTS_HEADER)?;
    writeln!(out)?;
    writeln!(out, "#define FIFO_SIZE {}", config.fifo_capacity)?;
    writeln!(out)?;

    let tags: Vec<String> = catalog.events().map(|e| format!("    {}", event_index(e))).collect();
    writeln!(out, "typedef enum {{")?;
    if !tags.is_empty() {
        writeln!(out, "{}", tags.join(",\n"))?;
    }
    writeln!(out, "}} FSM_Event;")?;
    writeln!(out)?;

    writeln!(out, "typedef struct {{")?;
    writeln!(out, "    int head = 0;")?;
    writeln!(out, "    int tail = 0;")?;
    writeln!(out, "    FSM_Event buffer[FIFO_SIZE];")?;
    writeln!(out, "}} Event_FIFO;")?;
    writeln!(out)?;

    writeln!(out, "void write_event(FSM_Event event);")?;
    writeln!(out, "int read_event(FSM_Event *event);")?;
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;

    Ok(out)
}

const WRITE_EVENT_DOC: &str = r#"/* Writes one event to the fifo buffer.
 *
 * Params:
 *   FSM_Event event -> event to be stored in the fifo
 *
 * Returns:
 *   void
 */
"#;

const WRITE_EVENT_BODY: &str = r#"    int next = fifo.tail + 1;

    if ((next == fifo.head) || ((next == FIFO_SIZE) && (fifo.head == 0))) {
        /* Buffer is full! */
    } else {
        /* Write event to end of buffer */
        fifo.buffer[fifo.tail] = event;
        fifo.tail = (fifo.tail == (FIFO_SIZE - 1)) ? 0 : next;
    }
"#;

const READ_EVENT: &str = r#"/* Reads one event from the fifo buffer.
 *
 * Params:
 *   FSM_Event *event -> location to put event
 *
 * Returns:
 *   0 -> nothing to read, event should be ignored
 *   1 -> success, event updated
 */
int read_event(FSM_Event *event) {
    if (fifo.head == fifo.tail) {
        /* Buffer is empty! */
        return 0;
    } else {
        *event = fifo.buffer[fifo.head];
        fifo.head = (fifo.head == (FIFO_SIZE - 1)) ? 0 : fifo.head + 1;
        return 1;
    }
}
"#;

/// Non-blocking single-producer/single-consumer ring buffer.
/// A full queue drops the new event; the producer decides what that means.
pub fn render_fifo_source(config: &GenConfig) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "{HEADER_COMMENT}")?;
    writeln!(out)?;
    writeln!(out, "#include \"{FIFO_HEADER}\"")?;
    writeln!(out, "#include \"{}\"", super::events::EVENTS_HEADER)?;
    if let (true, Some(platform)) = (config.irq_guard, &config.platform_header) {
        writeln!(out, "#include \"{platform}\"")?;
    }
    writeln!(out)?;
    writeln!(out, "Event_FIFO fifo;")?;
    writeln!(out)?;

    out.push_str(WRITE_EVENT_DOC);
    writeln!(out, "void write_event(FSM_Event event) {{")?;
    if config.irq_guard {
        writeln!(out, "    __disable_irq();")?;
    }
    out.push_str(WRITE_EVENT_BODY);
    if config.irq_guard {
        writeln!(out, "    __enable_irq();")?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    out.push_str(READ_EVENT);

    Ok(out)
}
