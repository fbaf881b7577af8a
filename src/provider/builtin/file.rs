use std::path::PathBuf;

use crate::command::{Command, Delete, Truncate};
use crate::deep_scan::DeepScanRequest;
use crate::error::{Result, SweepError};
use crate::matcher::PathMatcher;
use crate::provider::{ActionProvider, CommandStream};
use crate::rule::{Rule, SearchStrategy};
use crate::session::Session;

/// `delete`: one Delete per matched path. `search = "deep"` registers with
/// the shared deep scan instead.
pub struct DeleteProvider;

/// `shred`: like `delete`, always overwriting first.
pub struct ShredProvider;

/// `truncate`: empty each matched file in place.
pub struct TruncateProvider;

/// `deep-scan`: a `delete` rule that is always a deep search.
pub struct DeepScanProvider;

impl ActionProvider for DeleteProvider {
    fn id(&self) -> &'static str {
        "delete"
    }

    fn description(&self) -> &'static str {
        "Delete matching files and directories"
    }

    fn commands(&self, rule: &Rule, session: &Session) -> Result<CommandStream> {
        let shred = rule.shred.unwrap_or(session.shred);
        path_commands(rule, session, move |path| Box::new(Delete::new(path, shred)))
    }

    fn deep_scan(&self, rule: &Rule, session: &Session) -> Result<Vec<DeepScanRequest>> {
        let shred = rule.shred.unwrap_or(session.shred);
        let matcher = PathMatcher::from_rule(rule)?;
        Ok(matcher.deep_scan_requests(&session.variables, shred))
    }
}

impl ActionProvider for ShredProvider {
    fn id(&self) -> &'static str {
        "shred"
    }

    fn description(&self) -> &'static str {
        "Overwrite, then delete matching files"
    }

    fn commands(&self, rule: &Rule, session: &Session) -> Result<CommandStream> {
        path_commands(rule, session, |path| Box::new(Delete::shred(path)))
    }

    fn deep_scan(&self, rule: &Rule, session: &Session) -> Result<Vec<DeepScanRequest>> {
        let matcher = PathMatcher::from_rule(rule)?;
        Ok(matcher.deep_scan_requests(&session.variables, true))
    }
}

impl ActionProvider for TruncateProvider {
    fn id(&self) -> &'static str {
        "truncate"
    }

    fn description(&self) -> &'static str {
        "Truncate matching files to zero length"
    }

    fn commands(&self, rule: &Rule, session: &Session) -> Result<CommandStream> {
        reject_deep(rule)?;
        path_commands(rule, session, |path| Box::new(Truncate::new(path)))
    }
}

impl ActionProvider for DeepScanProvider {
    fn id(&self) -> &'static str {
        "deep-scan"
    }

    fn description(&self) -> &'static str {
        "Register a file-name regex with the shared deep scan"
    }

    fn commands(&self, rule: &Rule, _session: &Session) -> Result<CommandStream> {
        PathMatcher::from_rule(&as_deep(rule))?;
        Ok(Box::new(std::iter::empty()))
    }

    fn deep_scan(&self, rule: &Rule, session: &Session) -> Result<Vec<DeepScanRequest>> {
        DeleteProvider.deep_scan(&as_deep(rule), session)
    }
}

fn as_deep(rule: &Rule) -> Rule {
    rule.clone().with_search("deep")
}

/// Deep-scan hits are always deleted, so actions that do something else
/// cannot use `search = "deep"`.
pub(super) fn reject_deep(rule: &Rule) -> Result<()> {
    if rule.search_strategy()? == SearchStrategy::Deep {
        return Err(SweepError::InvalidSearch(format!(
            "deep (not supported by '{}')",
            rule.action
        )));
    }
    Ok(())
}

/// Match a rule's paths and wrap each one in a command.
pub(super) fn path_commands<F>(rule: &Rule, session: &Session, make: F) -> Result<CommandStream>
where
    F: Fn(PathBuf) -> Box<dyn Command> + 'static,
{
    let matcher = PathMatcher::from_rule(rule)?;
    let paths = matcher.into_paths(&session.variables)?;
    let action = rule.action.clone();
    Ok(Box::new(paths.map(move |path| {
        tracing::debug!(action = %action, path = %path.display(), "command resolved");
        make(path)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{run_to_completion, Mode};
    use std::fs;
    use tempfile::TempDir;

    fn dir_rule(action: &str, dir: &TempDir, search: &str) -> Rule {
        Rule::new(action)
            .with_path(dir.path().to_string_lossy().into_owned())
            .with_search(search)
    }

    #[test]
    fn walk_all_deletion_empties_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("a/b/c/f1"), b"1").unwrap();
        fs::write(dir.path().join("a/f2"), b"22").unwrap();
        fs::write(dir.path().join("f3"), b"333").unwrap();

        let session = Session::new();
        let commands = DeleteProvider
            .commands(&dir_rule("delete", &dir, "walk.all"), &session)
            .unwrap();
        let mut deleted = 0;
        for mut cmd in commands {
            run_to_completion(cmd.as_mut(), Mode::Execute, &session).unwrap();
            deleted += 1;
        }
        assert_eq!(deleted, 6);
        assert!(dir.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn preview_mutates_nothing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/log"), b"hello").unwrap();
        let session = Session::new();
        let providers: [&dyn ActionProvider; 3] = [&DeleteProvider, &ShredProvider, &TruncateProvider];
        for provider in providers {
            for _ in 0..3 {
                let commands = provider
                    .commands(&dir_rule(provider.id(), &dir, "walk.all"), &session)
                    .unwrap();
                for mut cmd in commands {
                    let _ = run_to_completion(cmd.as_mut(), Mode::Preview, &session);
                }
            }
        }
        assert_eq!(fs::read(dir.path().join("sub/log")).unwrap(), b"hello");
    }

    #[test]
    fn rule_shred_overrides_session() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f"), b"x").unwrap();
        let mut rule = dir_rule("delete", &dir, "walk.files");
        rule.shred = Some(true);
        let labels: Vec<String> = DeleteProvider
            .commands(&rule, &Session::new())
            .unwrap()
            .map(|c| c.label())
            .collect();
        assert_eq!(labels, vec!["Shred"]);
    }

    #[test]
    fn deep_rule_registers_instead_of_yielding() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Thumbs.db"), b"x").unwrap();
        let mut rule = dir_rule("delete", &dir, "deep");
        rule.regex = Some(r"^Thumbs\.db$".into());
        let session = Session::new();
        assert_eq!(DeleteProvider.commands(&rule, &session).unwrap().count(), 0);
        let requests = DeleteProvider.deep_scan(&rule, &session).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].root, dir.path());
    }

    #[test]
    fn deep_scan_action_forces_deep_search() {
        let dir = TempDir::new().unwrap();
        let mut rule = Rule::new("deep-scan").with_path(dir.path().to_string_lossy().into_owned());
        rule.regex = Some(r"\.tmp$".into());
        let requests = DeepScanProvider.deep_scan(&rule, &Session::new()).unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn invalid_search_fails_at_resolution() {
        let dir = TempDir::new().unwrap();
        let rule = dir_rule("delete", &dir, "recursive");
        assert!(matches!(
            DeleteProvider.commands(&rule, &Session::new()),
            Err(SweepError::InvalidSearch(_))
        ));
    }

    #[test]
    fn truncate_rejects_deep_search() {
        let dir = TempDir::new().unwrap();
        let mut rule = dir_rule("truncate", &dir, "deep");
        rule.regex = Some(r"\.log$".into());
        assert!(matches!(
            TruncateProvider.commands(&rule, &Session::new()),
            Err(SweepError::InvalidSearch(_))
        ));
    }
}
