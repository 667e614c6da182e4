//! Command line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use dot_fsm::{CodegenMode, GenConfig, OverlapPolicy};

#[derive(Parser, Debug)]
#[command(name = "dot-fsm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile a Graphviz state diagram into event-driven C++ state machines")]
#[command(long_about = r#"
Compile a Graphviz state diagram into event-driven C++ state machines.

Nodes whose label starts with (ENTRY) are initial states; every state
reachable from one becomes part of its machine. Edge labels name events:
  GO        -> GO_EVENT
  500(T2)   -> TIMER_2_EVENT, with TIMER_2 armed for 500 ms on entry
  (none)    -> taken immediately when the state is entered

ENVIRONMENT VARIABLES:
  DOT_FSM_FIFO_SIZE   Event FIFO capacity (default: 100)
  RUST_LOG            Log filter, overrides -v/-q
"#)]
pub struct Cli {
    /// Graphviz DOT file describing the state machines
    pub infile: PathBuf,

    /// Output directory; Inc/ and Src/ are created inside it
    pub outdir: PathBuf,

    /// Generate without timer support
    #[arg(short, long)]
    pub stubs: bool,

    /// Capacity of the generated event FIFO
    #[arg(long, env = "DOT_FSM_FIFO_SIZE", default_value_t = 100)]
    pub fifo_size: usize,

    /// Disable interrupts while writing to the event FIFO
    #[arg(long)]
    pub irq_guard: bool,

    /// Platform header included by user hooks (empty to omit)
    #[arg(long, value_name = "NAME", default_value = "main.h")]
    pub platform_header: String,

    /// Copy states shared by several entries into each machine instead of failing
    #[arg(long)]
    pub allow_overlap: bool,

    /// Keep an existing Src/user_states.cpp
    #[arg(long)]
    pub preserve_user: bool,

    /// Use this runtime header instead of the bundled tinyfsm.hpp
    #[arg(long, value_name = "PATH")]
    pub runtime_header: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn config(&self) -> GenConfig {
        GenConfig {
            mode: if self.stubs {
                CodegenMode::Stubs
            } else {
                CodegenMode::Full
            },
            fifo_capacity: self.fifo_size,
            overlap: if self.allow_overlap {
                OverlapPolicy::Duplicate
            } else {
                OverlapPolicy::Reject
            },
            irq_guard: self.irq_guard,
            platform_header: Some(self.platform_header.clone()).filter(|h| !h.is_empty()),
            preserve_user_sources: self.preserve_user,
            runtime_header: self.runtime_header.clone(),
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
