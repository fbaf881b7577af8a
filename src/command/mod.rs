//! Executable units of work.
//!
//! Every command has a single entry point, [`Command::step`], called with
//! either [`Mode::Preview`] (read-only: it may only look at sizes and
//! existence) or [`Mode::Execute`] (the real effect, at most once).
//! Long-running commands answer with [`Step::Progress`] until they are
//! done; the caller keeps calling `step` with the same mode.

pub mod config_edit;
pub mod delete;
pub mod function;
pub mod registry;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::Session;

pub use config_edit::{IniEdit, JsonEdit};
pub use delete::{Delete, Truncate};
pub use function::{FunctionCommand, Reclaim};
pub use registry::RegistryEdit;

/// Which phase a command runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Preview,
    Execute,
}

impl From<bool> for Mode {
    /// `true` means really do it.
    fn from(really: bool) -> Self {
        if really {
            Self::Execute
        } else {
            Self::Preview
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preview => write!(f, "preview"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// Outcome of one `step` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Still working; call again.
    Progress,
    /// Finished. `None` means the command has nothing to report (whitelisted
    /// target, registry key that never existed, not applicable here).
    Done(Option<ExecutionResult>),
}

/// What one preview or execute call did (or would do).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Human description, e.g. "Delete".
    pub label: String,
    pub deleted_count: u64,
    /// 1 when the operation is not a plain delete.
    pub special_count: u64,
    /// Target path, or a descriptor for path-less operations.
    pub path: String,
    /// Bytes reclaimed; `None` when unknown until executed.
    pub size: Option<u64>,
}

/// A pending operation derived from a rule.
pub trait Command {
    fn label(&self) -> String;

    /// Filesystem target, if the operation has one.
    fn target(&self) -> Option<&Path>;

    fn step(&mut self, mode: Mode, session: &Session) -> Result<Step>;

    /// Path or synthetic descriptor used in reports.
    fn descriptor(&self) -> String {
        match self.target() {
            Some(path) => path.display().to_string(),
            None => self.label(),
        }
    }
}

/// Drive a command until it stops reporting progress.
pub fn run_to_completion(
    command: &mut dyn Command,
    mode: Mode,
    session: &Session,
) -> Result<Option<ExecutionResult>> {
    loop {
        match command.step(mode, session)? {
            Step::Progress => continue,
            Step::Done(result) => return Ok(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_maps_to_mode() {
        assert_eq!(Mode::from(false), Mode::Preview);
        assert_eq!(Mode::from(true), Mode::Execute);
    }

    #[test]
    fn descriptor_falls_back_to_label() {
        let cmd = FunctionCommand::reclaim("Vacuum", || Ok(Reclaim::Freed(0)));
        assert_eq!(cmd.descriptor(), "Vacuum");
    }
}
