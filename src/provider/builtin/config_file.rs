use crate::command::{IniEdit, JsonEdit};
use crate::error::Result;
use crate::provider::{ActionProvider, CommandStream};
use crate::rule::Rule;
use crate::session::Session;

use super::file::{path_commands, reject_deep};

/// `ini`: drop a section (or one parameter of it) from each matched file.
pub struct IniProvider;

/// `json`: drop the value at `address` from each matched file.
pub struct JsonProvider;

impl ActionProvider for IniProvider {
    fn id(&self) -> &'static str {
        "ini"
    }

    fn description(&self) -> &'static str {
        "Remove a section or parameter from INI files"
    }

    fn commands(&self, rule: &Rule, session: &Session) -> Result<CommandStream> {
        reject_deep(rule)?;
        let section = rule.require("section", &rule.section)?.to_string();
        let parameter = rule.parameter.clone();
        path_commands(rule, session, move |path| {
            Box::new(IniEdit::new(path, section.clone(), parameter.clone()))
        })
    }
}

impl ActionProvider for JsonProvider {
    fn id(&self) -> &'static str {
        "json"
    }

    fn description(&self) -> &'static str {
        "Remove a value from JSON files"
    }

    fn commands(&self, rule: &Rule, session: &Session) -> Result<CommandStream> {
        reject_deep(rule)?;
        let address = rule.require("address", &rule.address)?.to_string();
        path_commands(rule, session, move |path| {
            Box::new(JsonEdit::new(path, address.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{run_to_completion, Mode};
    use crate::error::SweepError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn ini_requires_section() {
        let rule = Rule::new("ini").with_path("/tmp/whatever.ini");
        assert!(matches!(
            IniProvider.commands(&rule, &Session::new()),
            Err(SweepError::MissingParameter { .. })
        ));
    }

    #[test]
    fn ini_edits_every_matched_profile() {
        let dir = TempDir::new().unwrap();
        for profile in ["one", "two"] {
            fs::create_dir(dir.path().join(profile)).unwrap();
            fs::write(
                dir.path().join(profile).join("app.ini"),
                "[MRU]\nitem=1\n[Keep]\nx=1\n",
            )
            .unwrap();
        }
        let mut rule = Rule::new("ini")
            .with_path(dir.path().join("*/app.ini").to_string_lossy().into_owned())
            .with_search("glob");
        rule.section = Some("MRU".into());

        let session = Session::new();
        let commands: Vec<_> = IniProvider.commands(&rule, &session).unwrap().collect();
        assert_eq!(commands.len(), 2);
        for mut cmd in commands {
            run_to_completion(cmd.as_mut(), Mode::Execute, &session).unwrap();
        }
        for profile in ["one", "two"] {
            let content = fs::read_to_string(dir.path().join(profile).join("app.ini")).unwrap();
            assert_eq!(content, "[Keep]\nx=1\n");
        }
    }

    #[test]
    fn json_missing_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let mut rule = Rule::new("json")
            .with_path(dir.path().join("prefs.json").to_string_lossy().into_owned());
        rule.address = Some("recent".into());
        assert_eq!(JsonProvider.commands(&rule, &Session::new()).unwrap().count(), 0);
    }

    #[test]
    fn config_edits_reject_deep_search() {
        let mut rule = Rule::new("ini").with_path("/tmp").with_search("deep");
        rule.regex = Some(r"\.ini$".into());
        rule.section = Some("MRU".into());
        rule.address = Some("recent".into());
        assert!(matches!(
            IniProvider.commands(&rule, &Session::new()),
            Err(SweepError::InvalidSearch(_))
        ));
        rule.action = "json".into();
        assert!(matches!(
            JsonProvider.commands(&rule, &Session::new()),
            Err(SweepError::InvalidSearch(_))
        ));
    }
}
