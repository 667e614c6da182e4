//! Code generation for the C++ output tree.

use std::path::{Path, PathBuf};

use dot_fsm_core::{EventCatalog, StateGraph, partitions};

use crate::CodegenError;
use crate::config::{GenConfig, MIN_FIFO_CAPACITY};
use crate::ir::MachineIr;

mod driver;
mod events;
mod fifo;
mod machine;
mod user_states;

pub use driver::{DRIVER_HEADER, DRIVER_SOURCE};
pub use events::EVENTS_HEADER;
pub use fifo::{FIFO_HEADER, FIFO_SOURCE};
pub use user_states::{USER_STATES_HEADER, USER_STATES_SOURCE};

/// Directory for headers, relative to the output root.
pub const INC_DIR: &str = "Inc";
/// Directory for sources, relative to the output root.
pub const SRC_DIR: &str = "Src";
/// File name of the state machine runtime header.
pub const RUNTIME_HEADER: &str = "tinyfsm.hpp";

const BUNDLED_RUNTIME: &str = include_str!("../runtime/tinyfsm.hpp");

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
    /// The user is expected to edit this file after generation.
    pub user_editable: bool,
}

/// Every file of one generation run, in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    files: Vec<Artifact>,
}

impl Artifacts {
    fn push(&mut self, dir: &str, name: &str, contents: String) {
        self.files.push(Artifact {
            path: Path::new(dir).join(name),
            contents,
            user_editable: false,
        });
    }

    fn push_user(&mut self, dir: &str, name: &str, contents: String) {
        self.push(dir, name, contents);
        if let Some(last) = self.files.last_mut() {
            last.user_editable = true;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> + '_ {
        self.files.iter()
    }

    /// Looks up a file by its relative path, e.g. `Inc/Events.hpp`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&Artifact> {
        let path = path.as_ref();
        self.files.iter().find(|a| a.path == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl IntoIterator for Artifacts {
    type Item = Artifact;
    type IntoIter = std::vec::IntoIter<Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Generate the complete output tree in memory.
///
/// Nothing touches the file system except reading a custom runtime header, so
/// any error surfaces before a single output file is written.
pub fn generate(graph: &StateGraph, config: &GenConfig) -> Result<Artifacts, CodegenError> {
    if config.fifo_capacity < MIN_FIFO_CAPACITY {
        return Err(CodegenError::FifoCapacity(config.fifo_capacity));
    }

    let catalog = EventCatalog::build(graph);
    let machines: Vec<MachineIr> = partitions(graph, config.overlap)?
        .iter()
        .map(|partition| MachineIr::new(graph, partition))
        .collect();

    let runtime = match config.runtime_header {
        Some(ref path) => std::fs::read_to_string(path).map_err(|source| CodegenError::RuntimeHeader {
            path: path.clone(),
            source,
        })?,
        None => BUNDLED_RUNTIME.to_string(),
    };

    let mut artifacts = Artifacts::default();
    artifacts.push(INC_DIR, RUNTIME_HEADER, runtime);
    artifacts.push(INC_DIR, EVENTS_HEADER, events::render_events_header(&catalog, config)?);
    artifacts.push(INC_DIR, FIFO_HEADER, fifo::render_fifo_header(&catalog, config)?);
    artifacts.push(SRC_DIR, FIFO_SOURCE, fifo::render_fifo_source(config)?);
    artifacts.push(INC_DIR, DRIVER_HEADER, driver::render_driver_header()?);
    artifacts.push(SRC_DIR, DRIVER_SOURCE, driver::render_driver_source(&catalog, &machines)?);
    artifacts.push(
        INC_DIR,
        USER_STATES_HEADER,
        user_states::render_user_states_header(graph, config)?,
    );
    artifacts.push_user(
        SRC_DIR,
        USER_STATES_SOURCE,
        user_states::render_user_states_source(graph)?,
    );

    for ir in &machines {
        artifacts.push(
            INC_DIR,
            &machine::header_name(ir),
            machine::render_machine_header(ir, &catalog)?,
        );
        artifacts.push(
            SRC_DIR,
            &machine::source_name(ir),
            machine::render_machine_source(ir, config)?,
        );
    }

    tracing::debug!(
        files = artifacts.len(),
        machines = machines.len(),
        events = catalog.len(),
        "rendered output tree"
    );
    Ok(artifacts)
}
