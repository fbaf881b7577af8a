//! Parsed rule records.
//!
//! A `Rule` is what the rule loader hands the engine: one declarative
//! cleaning action. The engine reads rules, it never mutates them.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// One cleaning action, as produced by the rule loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Provider id (e.g. "delete", "ini", "winreg").
    pub action: String,
    /// Optional human label; providers fall back to their own.
    #[serde(default)]
    pub label: Option<String>,
    /// Path pattern. May contain `$$name$$` tokens, `~`, `$VAR` and globs.
    #[serde(default)]
    pub path: Option<String>,
    /// Raw search strategy, validated when the rule is resolved.
    #[serde(default)]
    pub search: Option<String>,
    /// Basename include filter.
    #[serde(default)]
    pub regex: Option<String>,
    /// Basename exclude filter.
    #[serde(default)]
    pub nregex: Option<String>,
    /// Full-path include filter.
    #[serde(default)]
    pub wholeregex: Option<String>,
    /// Full-path exclude filter.
    #[serde(default)]
    pub nwholeregex: Option<String>,
    #[serde(default, rename = "type")]
    pub entry_type: Option<EntryType>,
    /// Per-rule override of the session's shred setting.
    #[serde(default)]
    pub shred: Option<bool>,
    /// INI section.
    #[serde(default)]
    pub section: Option<String>,
    /// INI parameter within `section`.
    #[serde(default)]
    pub parameter: Option<String>,
    /// JSON address, slash separated (`a/b/c`).
    #[serde(default)]
    pub address: Option<String>,
    /// Registry key.
    #[serde(default)]
    pub key: Option<String>,
    /// Registry value name.
    #[serde(default)]
    pub name: Option<String>,
    /// External command line for `process` and `package-manager`.
    #[serde(default)]
    pub command: Vec<String>,
}

impl Rule {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Parse the raw `search` attribute. Missing means `file`.
    pub fn search_strategy(&self) -> Result<SearchStrategy> {
        match &self.search {
            None => Ok(SearchStrategy::File),
            Some(s) => SearchStrategy::parse(s),
        }
    }

    /// Fetch a required kind-specific parameter.
    pub fn require<'a>(&self, parameter: &str, value: &'a Option<String>) -> Result<&'a str> {
        value
            .as_deref()
            .ok_or_else(|| SweepError::MissingParameter {
                action: self.action.clone(),
                parameter: parameter.into(),
            })
    }

    pub fn require_path(&self) -> Result<&str> {
        self.require("path", &self.path)
    }
}

/// How a rule's path pattern turns into candidate paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// The literal path, if it exists.
    File,
    /// Shell glob, non-recursive.
    Glob,
    /// Regular files beneath each root.
    WalkFiles,
    /// Files and directories beneath each root, children first.
    WalkAll,
    /// Like `WalkAll`, then the root itself.
    WalkTop,
    /// Registered with the shared deep scanner instead.
    Deep,
}

impl SearchStrategy {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(Self::File),
            "glob" => Ok(Self::Glob),
            "walk.files" => Ok(Self::WalkFiles),
            "walk.all" => Ok(Self::WalkAll),
            "walk.top" => Ok(Self::WalkTop),
            "deep" => Ok(Self::Deep),
            other => Err(SweepError::InvalidSearch(other.into())),
        }
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Glob => write!(f, "glob"),
            Self::WalkFiles => write!(f, "walk.files"),
            Self::WalkAll => write!(f, "walk.all"),
            Self::WalkTop => write!(f, "walk.top"),
            Self::Deep => write!(f, "deep"),
        }
    }
}

/// Entry-type filter, checked without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    #[serde(rename = "f", alias = "file")]
    File,
    #[serde(rename = "d", alias = "dir", alias = "directory")]
    Directory,
}

/// Rules file as read by the CLI: a flat list of `[[rule]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
