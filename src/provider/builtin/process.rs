use std::path::PathBuf;

use crate::command::{Command, FunctionCommand, Reclaim};
use crate::error::{Result, SweepError};
use crate::fsops::{find_executable, tree_size};
use crate::matcher::expand::expand_user_and_env;
use crate::provider::{ActionProvider, CommandStream};
use crate::rule::Rule;
use crate::session::Session;

/// `process`: run an external command line.
pub struct ProcessProvider;

/// `package-manager`: run a package manager's cache-cleaning command.
///
/// Yields nothing when the program is not installed. When the rule names a
/// `path` (the package cache), the bytes freed there are reported.
pub struct PackageManagerProvider;

impl ActionProvider for ProcessProvider {
    fn id(&self) -> &'static str {
        "process"
    }

    fn description(&self) -> &'static str {
        "Run an external command"
    }

    fn commands(&self, rule: &Rule, _session: &Session) -> Result<CommandStream> {
        let argv = require_command(rule)?;
        let label = rule
            .label
            .clone()
            .unwrap_or_else(|| "Run external command".into());
        let op_label = label.clone();
        let command: Box<dyn Command> = Box::new(FunctionCommand::reclaim(label, move || {
            run(&op_label, &argv)?;
            Ok(Reclaim::Freed(0))
        }));
        Ok(Box::new(std::iter::once(command)))
    }
}

impl ActionProvider for PackageManagerProvider {
    fn id(&self) -> &'static str {
        "package-manager"
    }

    fn description(&self) -> &'static str {
        "Clean a package manager cache, if the package manager is installed"
    }

    fn commands(&self, rule: &Rule, _session: &Session) -> Result<CommandStream> {
        let mut argv = require_command(rule)?;
        let Some(program) = find_executable(&argv[0]) else {
            tracing::debug!(program = %argv[0], "package manager not installed, nothing to do");
            return Ok(Box::new(std::iter::empty()));
        };
        argv[0] = program.display().to_string();

        let cache: Option<PathBuf> = rule
            .path
            .as_deref()
            .map(|p| PathBuf::from(expand_user_and_env(p)));
        let label = rule
            .label
            .clone()
            .unwrap_or_else(|| "Clean package cache".into());
        let op_label = label.clone();
        let command: Box<dyn Command> = Box::new(FunctionCommand::reclaim(label, move || {
            let before = cache.as_deref().map(tree_size).unwrap_or(0);
            run(&op_label, &argv)?;
            let after = cache.as_deref().map(tree_size).unwrap_or(0);
            Ok(Reclaim::Freed(before.saturating_sub(after)))
        }));
        Ok(Box::new(std::iter::once(command)))
    }
}

fn require_command(rule: &Rule) -> Result<Vec<String>> {
    if rule.command.is_empty() {
        return Err(SweepError::MissingParameter {
            action: rule.action.clone(),
            parameter: "command".into(),
        });
    }
    Ok(rule.command.clone())
}

fn run(label: &str, argv: &[String]) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        return Err(SweepError::Internal("empty command line".into()));
    };
    tracing::info!(program = %program, ?args, "running external command");
    let output = std::process::Command::new(program).args(args).output()?;
    if !output.status.success() {
        return Err(SweepError::Function {
            label: label.into(),
            message: format!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(())
}
