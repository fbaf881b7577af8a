use std::path::Path;

use super::{Command, ExecutionResult, Mode, Step};
use crate::error::Result;
use crate::session::Session;

/// Delete a registry value, or a whole key when no value name is given.
///
/// Reports nothing when the target never existed, so rules for software
/// that was never installed can be hidden.
#[derive(Debug, Clone)]
pub struct RegistryEdit {
    key: String,
    value: Option<String>,
}

impl RegistryEdit {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl Command for RegistryEdit {
    fn label(&self) -> String {
        match self.value {
            Some(_) => "Delete registry value".into(),
            None => "Delete registry key".into(),
        }
    }

    fn target(&self) -> Option<&Path> {
        None
    }

    fn descriptor(&self) -> String {
        match &self.value {
            Some(name) => format!("{}\\{}", self.key, name),
            None => self.key.clone(),
        }
    }

    fn step(&mut self, mode: Mode, session: &Session) -> Result<Step> {
        let registry = session.registry();
        if !registry.is_available() {
            tracing::debug!(key = %self.key, "no registry on this platform");
            return Ok(Step::Done(None));
        }

        let value = self.value.as_deref();
        let acted = match mode {
            Mode::Preview => registry.exists(&self.key, value)?,
            Mode::Execute => registry.delete(&self.key, value)?,
        };
        if !acted {
            return Ok(Step::Done(None));
        }

        Ok(Step::Done(Some(ExecutionResult {
            label: self.label(),
            deleted_count: 1,
            special_count: 0,
            path: self.descriptor(),
            size: None,
        })))
    }
}
