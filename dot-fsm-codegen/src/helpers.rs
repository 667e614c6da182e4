/// Banner written at the top of every generated file.
pub const HEADER_COMMENT: &str = "/* auto-generated by dot-fsm */";

/// Generates the state class name: `[Machine]_[node]`
pub fn state_class(machine: &str, node: &str) -> String {
    format!("{machine}_{node}")
}

/// Generates the user hook name: `state_[node]`
pub fn hook_name(node: &str) -> String {
    format!("state_{node}")
}

/// Generates the user hook prototype: `void state_[node](void)`
pub fn hook_prototype(node: &str) -> String {
    format!("void {}(void)", hook_name(node))
}

/// Generates the FIFO tag for an event: `[EVENT]_INDEX`
pub fn event_index(event: &str) -> String {
    format!("{event}_INDEX")
}

/// Generates the preallocated dispatch instance: `[EVENT]_SINGLETON`
pub fn event_singleton(event: &str) -> String {
    format!("{event}_SINGLETON")
}

/// Generates an include guard from a file name: `Events.hpp` -> `EVENTS_HPP_`
pub fn include_guard(file_name: &str) -> String {
    let mut guard: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    guard.push('_');
    guard
}

/// Makes arbitrary label text safe inside a `/* */` comment.
pub fn comment_text(text: &str) -> String {
    text.replace("*/", "* /").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(state_class("FSM2", "S03"), "FSM2_S03");
        assert_eq!(hook_prototype("S03"), "void state_S03(void)");
        assert_eq!(event_index("GO_EVENT"), "GO_EVENT_INDEX");
        assert_eq!(event_singleton("GO_EVENT"), "GO_EVENT_SINGLETON");
    }

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard("Events.hpp"), "EVENTS_HPP_");
        assert_eq!(include_guard("fsm_fifo.hpp"), "FSM_FIFO_HPP_");
        assert_eq!(include_guard("FSM1.hpp"), "FSM1_HPP_");
    }

    #[test]
    fn test_comment_text() {
        assert_eq!(comment_text("a */ b\nc"), "a * / b c");
    }
}
