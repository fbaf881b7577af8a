//! Turns a rule's path pattern and search strategy into candidate paths.
//!
//! Expansion (`$$name$$` tokens, `~`, environment variables) happens first,
//! then the strategy produces raw candidates, then the rule's filters run:
//! basename include, basename exclude, full-path include, full-path
//! exclude, entry type.

pub mod expand;

use std::path::{Path, PathBuf};

use glob::MatchOptions;
use regex::{Regex, RegexBuilder};
use walkdir::WalkDir;

use crate::deep_scan::DeepScanRequest;
use crate::error::{Result, SweepError};
use crate::rule::{EntryType, Rule, SearchStrategy};

pub use expand::{expand_pattern, expand_vars, Variables};

/// Whether path comparisons on this platform ignore case.
pub const CASE_INSENSITIVE_PATHS: bool = cfg!(any(windows, target_os = "macos"));

/// Lazy stream of matched paths.
pub type PathStream = Box<dyn Iterator<Item = PathBuf>>;

/// Compiled form of a rule's path-selection attributes.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    strategy: SearchStrategy,
    filters: Filters,
}

#[derive(Debug, Clone, Default)]
struct Filters {
    regex: Option<Regex>,
    nregex: Option<Regex>,
    wholeregex: Option<Regex>,
    nwholeregex: Option<Regex>,
    entry_type: Option<EntryType>,
}

impl PathMatcher {
    /// Validate and compile a rule. Bad strategies and bad regexes fail here,
    /// before any command exists.
    pub fn from_rule(rule: &Rule) -> Result<Self> {
        let pattern = rule.require_path()?.to_string();
        let strategy = rule.search_strategy()?;
        let filters = Filters {
            regex: compile_filter(&rule.regex)?,
            nregex: compile_filter(&rule.nregex)?,
            wholeregex: compile_filter(&rule.wholeregex)?,
            nwholeregex: compile_filter(&rule.nwholeregex)?,
            entry_type: rule.entry_type,
        };
        if strategy == SearchStrategy::Deep && filters.regex.is_none() {
            return Err(SweepError::MissingParameter {
                action: rule.action.clone(),
                parameter: "regex".into(),
            });
        }
        Ok(Self {
            pattern,
            strategy,
            filters,
        })
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Expand the pattern and stream every candidate that survives the
    /// filters. `deep` rules stream nothing; see [`Self::deep_scan_requests`].
    pub fn into_paths(self, vars: &Variables) -> Result<PathStream> {
        if self.strategy == SearchStrategy::Deep {
            return Ok(Box::new(std::iter::empty()));
        }

        let patterns = expand_pattern(&self.pattern, vars);
        if self.strategy != SearchStrategy::File {
            for p in &patterns {
                glob::Pattern::new(p)?;
            }
        }

        let strategy = self.strategy;
        let filters = self.filters;
        let stream = patterns
            .into_iter()
            .flat_map(move |p| candidates(strategy, p))
            .filter(move |path| filters.accepts(path));
        Ok(Box::new(stream))
    }

    /// The `(root, regex)` pairs a `deep` rule contributes to the shared scan.
    pub fn deep_scan_requests(&self, vars: &Variables, shred: bool) -> Vec<DeepScanRequest> {
        if self.strategy != SearchStrategy::Deep {
            return Vec::new();
        }
        let Some(regex) = &self.filters.regex else {
            return Vec::new();
        };
        expand_pattern(&self.pattern, vars)
            .into_iter()
            .map(|root| DeepScanRequest {
                root: PathBuf::from(root),
                regex: regex.clone(),
                shred,
            })
            .collect()
    }

    /// Apply only the filters to an already-known path.
    pub fn accepts(&self, path: &Path) -> bool {
        self.filters.accepts(path)
    }
}

/// Compile a filter regex with the platform's path case rules.
pub fn compile_filter(pattern: &Option<String>) -> Result<Option<Regex>> {
    pattern
        .as_deref()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(CASE_INSENSITIVE_PATHS)
                .build()
                .map_err(SweepError::from)
        })
        .transpose()
}

/// `lexists`: true for broken symlinks too.
pub fn lexists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

impl Filters {
    fn accepts(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(re) = &self.regex {
            if !re.is_match(&name) {
                return false;
            }
        }
        if let Some(re) = &self.nregex {
            if re.is_match(&name) {
                return false;
            }
        }

        let whole = path.to_string_lossy();
        if let Some(re) = &self.wholeregex {
            if !re.is_match(&whole) {
                return false;
            }
        }
        if let Some(re) = &self.nwholeregex {
            if re.is_match(&whole) {
                return false;
            }
        }

        match self.entry_type {
            None => true,
            Some(wanted) => match std::fs::symlink_metadata(path) {
                Ok(meta) => match wanted {
                    EntryType::File => !meta.is_dir(),
                    EntryType::Directory => meta.is_dir(),
                },
                Err(_) => false,
            },
        }
    }
}

fn glob_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: !CASE_INSENSITIVE_PATHS,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

fn glob_paths(pattern: &str) -> PathStream {
    match glob::glob_with(pattern, glob_options()) {
        Ok(paths) => Box::new(paths.filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "glob entry unreadable, skipping");
                None
            }
        })),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid glob pattern");
            Box::new(std::iter::empty())
        }
    }
}

fn walk(root: PathBuf, include_root: bool, dirs: bool) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .min_depth(if include_root { 0 } else { 1 })
        .follow_links(false)
        .contents_first(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry during walk");
                None
            }
        })
        .filter(move |entry| dirs || !entry.file_type().is_dir())
        .map(|entry| entry.into_path())
}

fn candidates(strategy: SearchStrategy, pattern: String) -> PathStream {
    tracing::debug!(%strategy, pattern = %pattern, "resolving candidates");
    match strategy {
        SearchStrategy::File => {
            let path = PathBuf::from(pattern);
            if lexists(&path) {
                Box::new(std::iter::once(path))
            } else {
                Box::new(std::iter::empty())
            }
        }
        SearchStrategy::Glob => glob_paths(&pattern),
        SearchStrategy::WalkFiles => Box::new(
            glob_paths(&pattern)
                .filter(|root| root.is_dir())
                .flat_map(|root| walk(root, false, false)),
        ),
        SearchStrategy::WalkAll => Box::new(
            glob_paths(&pattern)
                .filter(|root| root.is_dir())
                .flat_map(|root| walk(root, false, true)),
        ),
        SearchStrategy::WalkTop => Box::new(
            glob_paths(&pattern)
                .filter(|root| root.is_dir())
                .flat_map(|root| walk(root, true, true)),
        ),
        SearchStrategy::Deep => Box::new(std::iter::empty()),
    }
}
