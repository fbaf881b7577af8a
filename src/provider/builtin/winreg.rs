use crate::command::{Command, RegistryEdit};
use crate::error::Result;
use crate::provider::{ActionProvider, CommandStream};
use crate::rule::Rule;
use crate::session::Session;

/// `winreg`: delete a registry value (`name` set) or a whole key.
///
/// The key comes from `key`, or from `path` for rule files that reuse it.
pub struct WinregProvider;

impl ActionProvider for WinregProvider {
    fn id(&self) -> &'static str {
        "winreg"
    }

    fn description(&self) -> &'static str {
        "Delete a Windows registry key or value"
    }

    fn commands(&self, rule: &Rule, _session: &Session) -> Result<CommandStream> {
        let key = match &rule.key {
            Some(key) => key.clone(),
            None => rule.require("key", &rule.path)?.to_string(),
        };
        let command: Box<dyn Command> = Box::new(RegistryEdit::new(key, rule.name.clone()));
        Ok(Box::new(std::iter::once(command)))
    }
}
