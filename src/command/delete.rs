use std::path::{Path, PathBuf};

use super::{Command, ExecutionResult, Mode, Step};
use crate::error::{Result, SweepError};
use crate::fsops::size_or_zero;
use crate::session::Session;

/// Remove one path, optionally shredding it first.
///
/// Shred is a flag on this command rather than its own type so both share
/// the locked-file handling.
#[derive(Debug, Clone)]
pub struct Delete {
    path: PathBuf,
    shred: bool,
}

impl Delete {
    pub fn new(path: impl Into<PathBuf>, shred: bool) -> Self {
        Self {
            path: path.into(),
            shred,
        }
    }

    pub fn shred(path: impl Into<PathBuf>) -> Self {
        Self::new(path, true)
    }

    fn result(&self, label: String, deleted: u64, special: u64, size: u64) -> ExecutionResult {
        ExecutionResult {
            label,
            deleted_count: deleted,
            special_count: special,
            path: self.path.display().to_string(),
            size: Some(size),
        }
    }
}

impl Command for Delete {
    fn label(&self) -> String {
        if self.shred { "Shred" } else { "Delete" }.into()
    }

    fn target(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn step(&mut self, mode: Mode, session: &Session) -> Result<Step> {
        if session.whitelist.is_whitelisted(&self.path) {
            tracing::debug!(path = %self.path.display(), "whitelisted, skipping");
            return Ok(Step::Done(None));
        }

        let ops = session.file_ops();
        let size = size_or_zero(ops, &self.path)?;
        if mode == Mode::Preview {
            return Ok(Step::Done(Some(self.result(self.label(), 1, 0, size))));
        }

        match ops.delete(&self.path, self.shred) {
            Ok(()) => Ok(Step::Done(Some(self.result(self.label(), 1, 0, size)))),
            Err(e) if ops.is_locked(&e) => match session.deferred_delete() {
                Some(deferred) => {
                    deferred.mark_for_deletion(&self.path)?;
                    tracing::warn!(path = %self.path.display(), "file in use, marked for deletion");
                    Ok(Step::Done(Some(self.result(
                        "Mark for deletion".into(),
                        0,
                        1,
                        size,
                    ))))
                }
                None => Err(SweepError::Locked(self.path.clone())),
            },
            Err(e) => Err(e.into()),
        }
    }
}

/// Empty a file in place; the directory entry stays.
#[derive(Debug, Clone)]
pub struct Truncate {
    path: PathBuf,
}

impl Truncate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Command for Truncate {
    fn label(&self) -> String {
        "Truncate".into()
    }

    fn target(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn step(&mut self, mode: Mode, session: &Session) -> Result<Step> {
        if session.whitelist.is_whitelisted(&self.path) {
            tracing::debug!(path = %self.path.display(), "whitelisted, skipping");
            return Ok(Step::Done(None));
        }

        let size = size_or_zero(session.file_ops(), &self.path)?;
        if mode == Mode::Execute {
            session.file_ops().truncate(&self.path)?;
        }
        Ok(Step::Done(Some(ExecutionResult {
            label: self.label(),
            deleted_count: 0,
            special_count: 1,
            path: self.path.display().to_string(),
            size: Some(size),
        })))
    }
}
