//! Canonical event names derived from edge labels.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::GraphError;

static TIMER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)\(T([0-9]+)\)$").expect("timer label pattern is valid")
});

static NAMED_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("event label pattern is valid")
});

/// Name of the struct every generated event derives from.
pub const BASE_EVENT: &str = "BASE_EVENT";

static TIMER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TIMER_[0-9]+$").expect("timer name pattern is valid"));

/// A hardware/software timer referenced by a `<ms>(T<id>)` label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerSpec {
    /// Timer id digits exactly as written after `T`; `T01` and `T1` differ.
    pub id: String,
    /// How long the timer runs before it fires its event.
    pub period: Duration,
}

impl TimerSpec {
    /// Name of the timer enumerator, e.g. `TIMER_1`.
    pub fn name(&self) -> String {
        format!("TIMER_{}", self.id)
    }

    /// Period in whole milliseconds, as passed to `start_timer`.
    pub fn millis(&self) -> u128 {
        self.period.as_millis()
    }
}

/// The event an edge reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalEvent {
    /// Empty label: the transition is taken without waiting for an event.
    Unconditional,
    /// Fired when the given timer expires.
    Timer(TimerSpec),
    /// A user event; holds the normalized, uppercased label.
    Named(String),
}

impl CanonicalEvent {
    /// The C++ event type name, or `None` for unconditional transitions.
    pub fn ident(&self) -> Option<String> {
        match self {
            CanonicalEvent::Unconditional => None,
            CanonicalEvent::Timer(timer) => Some(format!("TIMER_{}_EVENT", timer.id)),
            CanonicalEvent::Named(name) => Some(format!("{name}_EVENT")),
        }
    }

    pub fn is_unconditional(&self) -> bool {
        matches!(self, CanonicalEvent::Unconditional)
    }

    pub fn timer(&self) -> Option<&TimerSpec> {
        match self {
            CanonicalEvent::Timer(timer) => Some(timer),
            _ => None,
        }
    }
}

impl fmt::Display for CanonicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ident() {
            Some(ident) => f.write_str(&ident),
            None => f.write_str("<unconditional>"),
        }
    }
}

/// Maps a raw edge label to its canonical event.
///
/// The label is trimmed and every remaining whitespace character becomes an
/// underscore before matching. Timer labels take precedence over names, the
/// empty label is unconditional and anything else is rejected.
pub fn canonicalize(label: &str) -> Result<CanonicalEvent, GraphError> {
    let normalized: String = label
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    if let Some(caps) = TIMER_LABEL.captures(&normalized) {
        let period = caps[1]
            .parse::<u64>()
            .map_err(|_| malformed(label, "timer period out of range"))?;
        return Ok(CanonicalEvent::Timer(TimerSpec {
            id: caps[2].to_string(),
            period: Duration::from_millis(period),
        }));
    }

    if NAMED_LABEL.is_match(&normalized) {
        let name = normalized.to_uppercase();
        if format!("{name}_EVENT") == BASE_EVENT {
            return Err(malformed(label, "`BASE_EVENT` is the common base of all events"));
        }
        if TIMER_NAME.is_match(&name) {
            return Err(malformed(label, "`TIMER_<id>_EVENT` is reserved for timer labels"));
        }
        return Ok(CanonicalEvent::Named(name));
    }

    if normalized.is_empty() {
        return Ok(CanonicalEvent::Unconditional);
    }

    Err(malformed(
        label,
        "expected an empty label, `<ms>(T<id>)` or an identifier",
    ))
}

fn malformed(label: &str, reason: &str) -> GraphError {
    GraphError::MalformedLabel {
        label: label.to_string(),
        reason: reason.to_string(),
    }
}
