//! Generation settings threaded through every emitter.

use std::path::PathBuf;

use dot_fsm_core::OverlapPolicy;

/// Whether timer support is generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodegenMode {
    /// Timer enum, prototypes and `start_timer`/`stop_timer` calls.
    #[default]
    Full,
    /// No timer code anywhere; timer events still exist as plain events.
    Stubs,
}

impl CodegenMode {
    pub fn timers_enabled(self) -> bool {
        matches!(self, CodegenMode::Full)
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenConfig {
    pub mode: CodegenMode,

    /// Ring buffer slots in the event FIFO (default: 100). One slot is kept
    /// free to tell a full queue from an empty one.
    pub fifo_capacity: usize,

    /// Handling of entry nodes whose reachable states intersect.
    pub overlap: OverlapPolicy,

    /// Wrap `write_event` in `__disable_irq()` / `__enable_irq()`.
    pub irq_guard: bool,

    /// Board support header included by user hooks and the guarded FIFO.
    pub platform_header: Option<String>,

    /// Leave an existing `Src/user_states.cpp` untouched.
    pub preserve_user_sources: bool,

    /// Runtime header to copy instead of the bundled one.
    pub runtime_header: Option<PathBuf>,
}

/// Smallest usable FIFO: one live slot plus the sentinel slot.
pub const MIN_FIFO_CAPACITY: usize = 2;

fn default_fifo_capacity() -> usize {
    100
}

fn default_platform_header() -> Option<String> {
    Some("main.h".to_string())
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            mode: CodegenMode::default(),
            fifo_capacity: default_fifo_capacity(),
            overlap: OverlapPolicy::default(),
            irq_guard: false,
            platform_header: default_platform_header(),
            preserve_user_sources: false,
            runtime_header: None,
        }
    }
}

impl GenConfig {
    pub fn stubs() -> Self {
        Self {
            mode: CodegenMode::Stubs,
            ..Self::default()
        }
    }

    pub fn timers_enabled(&self) -> bool {
        self.mode.timers_enabled()
    }
}
