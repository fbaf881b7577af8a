pub mod builtin;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::deep_scan::DeepScanRequest;
use crate::error::{Result, SweepError};
use crate::rule::Rule;
use crate::session::Session;

/// Lazy stream of commands produced from one rule.
pub type CommandStream = Box<dyn Iterator<Item = Box<dyn Command>>>;

/// Translates rules of one action kind into commands.
pub trait ActionProvider: Send + Sync {
    /// Action id used in rule files (e.g. "delete").
    fn id(&self) -> &'static str;

    /// One-line summary for `list-actions`.
    fn description(&self) -> &'static str;

    /// Resolve a rule. Configuration problems fail here; a missing external
    /// capability yields an empty stream instead.
    fn commands(&self, rule: &Rule, session: &Session) -> Result<CommandStream>;

    /// Searches this rule contributes to the shared deep scan.
    fn deep_scan(&self, _rule: &Rule, _session: &Session) -> Result<Vec<DeepScanRequest>> {
        Ok(Vec::new())
    }
}

/// Metadata about a provider, used for `list-actions` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    pub description: String,
}

/// Providers keyed by action id. Built once, read-only afterwards.
pub struct ProviderRegistry {
    providers: BTreeMap<&'static str, Box<dyn ActionProvider>>,
}

impl ProviderRegistry {
    /// Registry with every built-in provider.
    pub fn builtin() -> Self {
        builtin::all_providers()
            .into_iter()
            .fold(Self::empty(), |registry, p| registry.with(p))
    }

    pub fn empty() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// Add (or replace) a provider under its id.
    pub fn with(mut self, provider: Box<dyn ActionProvider>) -> Self {
        self.providers.insert(provider.id(), provider);
        self
    }

    pub fn get(&self, action: &str) -> Result<&dyn ActionProvider> {
        self.providers
            .get(action)
            .map(|p| p.as_ref())
            .ok_or_else(|| SweepError::UnknownAction(action.into()))
    }

    /// List metadata for all registered providers.
    pub fn list(&self) -> Vec<ProviderInfo> {
        self.providers
            .values()
            .map(|p| ProviderInfo {
                id: p.id().into(),
                description: p.description().into(),
            })
            .collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
