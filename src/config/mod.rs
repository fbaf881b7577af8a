use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::deep_scan::DEFAULT_PROGRESS_INTERVAL;
use crate::error::Result;
use crate::matcher::Variables;
use crate::whitelist::WhitelistEntry;

/// Top-level configuration from `cachesweep.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub clean: CleanOptions,
    /// Paths never to delete, shred or truncate.
    #[serde(default)]
    pub whitelist: Vec<WhitelistEntry>,
    /// Values for `$$name$$` tokens in rule paths.
    #[serde(default)]
    pub variables: Variables,
}

/// Engine behavior knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOptions {
    /// Overwrite files before unlinking them.
    #[serde(default)]
    pub shred: bool,
    /// Gap between liveness markers during deep scans.
    #[serde(default = "default_interval_ms")]
    pub deep_scan_interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL.as_millis() as u64
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            shred: false,
            deep_scan_interval_ms: default_interval_ms(),
        }
    }
}

impl CleanOptions {
    pub fn deep_scan_interval(&self) -> Duration {
        Duration::from_millis(self.deep_scan_interval_ms)
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# cachesweep configuration

[clean]
# Overwrite file contents before deleting them.
shred = false

# How often (milliseconds) long deep scans report that they are still alive.
deep_scan_interval_ms = 250

# Paths that must never be deleted. kind is "file" or "folder".
# [[whitelist]]
# kind = "folder"
# path = "~/.mozilla/firefox/important-profile"

# Values substituted for $$name$$ tokens in rule paths.
# [variables]
# profile = ["default", "work"]
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whitelist::WhitelistKind;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.clean.deep_scan_interval(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn starter_toml_parses() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert!(!config.clean.shred);
        assert!(config.whitelist.is_empty());
    }

    #[test]
    fn loads_whitelist_and_variables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cachesweep.toml");
        std::fs::write(
            &path,
            r#"
[clean]
shred = true

[[whitelist]]
kind = "folder"
path = "/home/me/keep"

[variables]
profile = ["a", "b"]
"#,
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert!(config.clean.shred);
        assert_eq!(config.clean.deep_scan_interval_ms, 250);
        assert_eq!(config.whitelist[0].kind, WhitelistKind::Folder);
        assert_eq!(config.variables["profile"], vec!["a", "b"]);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[clean\nshred = ").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
