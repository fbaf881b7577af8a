//! cachesweep: rule-driven cleaner for caches, histories and traces.
//!
//! Rules describe *what* to clean (paths, globs, walks, file-name regexes,
//! INI sections, JSON values, registry keys, external commands). The engine
//! resolves each rule into a lazy stream of commands that can be previewed
//! (sizes only, nothing touched) or executed.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use cachesweep::{clean, command::Mode, RunOptions};
//!
//! let options = RunOptions { mode: Mode::Preview, ..RunOptions::default() };
//! let report = clean(Path::new("rules.toml"), &options).unwrap();
//! println!("{} bytes would be freed", report.bytes);
//! ```

pub mod command;
pub mod config;
pub mod deep_scan;
pub mod error;
pub mod fsops;
pub mod matcher;
pub mod output;
pub mod provider;
pub mod rule;
pub mod session;
pub mod whitelist;
pub mod worker;

use std::path::{Path, PathBuf};

use command::Mode;
use config::Config;
use error::Result;
use output::OutputFormat;
use provider::ProviderRegistry;
use rule::RuleSet;
use session::Session;
use worker::{BatchReport, Worker};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "cachesweep.toml";

/// Options for one cleaning run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path to config file (defaults to `cachesweep.toml`).
    pub config_path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    pub mode: Mode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            mode: Mode::Preview,
        }
    }
}

/// Load a rules file and run every rule in it.
pub fn clean(rules_path: &Path, options: &RunOptions) -> Result<BatchReport> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = Config::load(&config_path)?;

    let content = std::fs::read_to_string(rules_path)?;
    let rules = RuleSet::from_toml(&content)?;
    tracing::info!(
        rules = rules.rules.len(),
        mode = %options.mode,
        file = %rules_path.display(),
        "rules loaded"
    );

    Ok(run_rules(&rules.rules, &config, options.mode))
}

/// Run already-parsed rules under a config.
pub fn run_rules(rules: &[rule::Rule], config: &Config, mode: Mode) -> BatchReport {
    let session = Session::from_config(config);
    let registry = ProviderRegistry::builtin();
    Worker::new(&session, &registry, rules, mode).run()
}

/// Render a batch report in the specified format.
pub fn render_report(report: &BatchReport, format: OutputFormat) -> Result<String> {
    output::render(report, format)
}
