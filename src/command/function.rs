use std::path::{Path, PathBuf};

use super::{Command, ExecutionResult, Mode, Step};
use crate::error::Result;
use crate::fsops::size_or_zero;
use crate::session::Session;

/// What a path-less operation reports each time it is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reclaim {
    /// Not finished; poll again.
    Working,
    /// Finished, having freed this many bytes.
    Freed(u64),
}

type ReclaimFn = Box<dyn FnMut() -> Result<Reclaim>>;
type PathFn = Box<dyn Fn(&Path) -> Result<()>>;

enum Operation {
    Reclaim(ReclaimFn),
    OnPath { path: PathBuf, op: PathFn },
}

/// Wraps an external operation.
///
/// Path-less operations report their own byte count, possibly after a run
/// of `Working` polls. Path-taking operations are measured: size before
/// minus size after.
pub struct FunctionCommand {
    label: String,
    operation: Operation,
}

impl FunctionCommand {
    pub fn reclaim(
        label: impl Into<String>,
        op: impl FnMut() -> Result<Reclaim> + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            operation: Operation::Reclaim(Box::new(op)),
        }
    }

    pub fn on_path(
        label: impl Into<String>,
        path: impl Into<PathBuf>,
        op: impl Fn(&Path) -> Result<()> + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            operation: Operation::OnPath {
                path: path.into(),
                op: Box::new(op),
            },
        }
    }

    fn result(&self, size: Option<u64>) -> ExecutionResult {
        ExecutionResult {
            label: self.label.clone(),
            deleted_count: 0,
            special_count: 1,
            path: self.descriptor(),
            size,
        }
    }
}

impl std::fmt::Debug for FunctionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionCommand")
            .field("label", &self.label)
            .field("target", &self.target())
            .finish()
    }
}

impl Command for FunctionCommand {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn target(&self) -> Option<&Path> {
        match &self.operation {
            Operation::Reclaim(_) => None,
            Operation::OnPath { path, .. } => Some(path),
        }
    }

    fn step(&mut self, mode: Mode, session: &Session) -> Result<Step> {
        let size = match (&mut self.operation, mode) {
            (Operation::Reclaim(_), Mode::Preview) => None,
            (Operation::Reclaim(op), Mode::Execute) => match op()? {
                Reclaim::Working => return Ok(Step::Progress),
                Reclaim::Freed(bytes) => Some(bytes),
            },
            (Operation::OnPath { path, .. }, Mode::Preview) => {
                Some(size_or_zero(session.file_ops(), path)?)
            }
            (Operation::OnPath { path, op }, Mode::Execute) => {
                let before = size_or_zero(session.file_ops(), path)?;
                op(path)?;
                let after = size_or_zero(session.file_ops(), path)?;
                Some(before.saturating_sub(after))
            }
        };
        Ok(Step::Done(Some(self.result(size))))
    }
}
