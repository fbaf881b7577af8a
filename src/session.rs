use std::time::Duration;

use crate::config::Config;
use crate::fsops::{DeferredDelete, FileOps, LocalFs, NoRegistry, Registry};
use crate::matcher::Variables;
use crate::whitelist::Whitelist;

/// Everything a run needs that would otherwise be process-wide state.
///
/// Built once per run and passed by reference to providers and commands.
pub struct Session {
    pub variables: Variables,
    pub whitelist: Whitelist,
    /// Default shred setting; rules may override it.
    pub shred: bool,
    pub deep_scan_interval: Duration,
    file_ops: Box<dyn FileOps>,
    deferred_delete: Option<Box<dyn DeferredDelete>>,
    registry: Box<dyn Registry>,
}

impl Session {
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            variables: config.variables.clone(),
            whitelist: Whitelist::new(&config.whitelist),
            shred: config.clean.shred,
            deep_scan_interval: config.clean.deep_scan_interval(),
            file_ops: Box::new(LocalFs),
            deferred_delete: None,
            registry: Box::new(NoRegistry),
        }
    }

    pub fn with_file_ops(mut self, ops: impl FileOps + 'static) -> Self {
        self.file_ops = Box::new(ops);
        self
    }

    pub fn with_deferred_delete(mut self, deferred: impl DeferredDelete + 'static) -> Self {
        self.deferred_delete = Some(Box::new(deferred));
        self
    }

    pub fn with_registry(mut self, registry: impl Registry + 'static) -> Self {
        self.registry = Box::new(registry);
        self
    }

    pub fn file_ops(&self) -> &dyn FileOps {
        self.file_ops.as_ref()
    }

    pub fn deferred_delete(&self) -> Option<&dyn DeferredDelete> {
        self.deferred_delete.as_deref()
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
