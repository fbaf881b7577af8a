//! User-declared exemptions from deletion.
//!
//! Entries get the same `~` and `$VAR` expansion as rule paths and are
//! compared component by component, so doubled or trailing separators in
//! either side never change the outcome.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matcher::expand::expand_user_and_env;
use crate::matcher::CASE_INSENSITIVE_PATHS;

/// Kind of exemption a whitelist entry grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitelistKind {
    /// Exactly this path.
    File,
    /// This directory and everything beneath it.
    Folder,
}

/// User-declared exemption, as stored in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub kind: WhitelistKind,
    pub path: String,
}

/// Paths that delete, shred and truncate commands must leave alone.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    entries: Vec<WhitelistEntry>,
    normalized: Vec<(WhitelistKind, PathBuf)>,
}

impl Whitelist {
    pub fn new(entries: &[WhitelistEntry]) -> Self {
        let mut whitelist = Self::default();
        whitelist.set(entries);
        whitelist
    }

    /// Replace the whole list.
    pub fn set(&mut self, entries: &[WhitelistEntry]) {
        self.entries = entries.to_vec();
        self.normalized = entries
            .iter()
            .map(|e| (e.kind, normalize(Path::new(&expand_user_and_env(&e.path)))))
            .collect();
    }

    /// Entries as configured, before expansion.
    pub fn entries(&self) -> Vec<WhitelistEntry> {
        self.entries.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_whitelisted(&self, path: &Path) -> bool {
        if self.normalized.is_empty() {
            return false;
        }
        let candidate = normalize(path);
        self.normalized.iter().any(|(kind, entry)| match kind {
            WhitelistKind::File => candidate == *entry,
            WhitelistKind::Folder => candidate.starts_with(entry),
        })
    }
}

/// Rebuild from components (drops repeated separators, trailing separators
/// and `.`), case-folded where the filesystem ignores case.
fn normalize(path: &Path) -> PathBuf {
    let rebuilt: PathBuf = path.components().collect();
    if CASE_INSENSITIVE_PATHS {
        PathBuf::from(rebuilt.to_string_lossy().to_lowercase())
    } else {
        rebuilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn folder(path: &str) -> Whitelist {
        Whitelist::new(&[WhitelistEntry {
            kind: WhitelistKind::Folder,
            path: path.into(),
        }])
    }

    #[test]
    fn empty_whitelist_matches_nothing() {
        assert!(!Whitelist::default().is_whitelisted(Path::new("/home")));
    }

    #[cfg(unix)]
    #[test]
    fn folder_matches_on_separator_boundaries() {
        let wl = folder("/home/folder");
        assert!(wl.is_whitelisted(Path::new("/home/folder")));
        assert!(wl.is_whitelisted(Path::new("/home/folder/")));
        assert!(wl.is_whitelisted(Path::new("/home/folder/file")));
        assert!(wl.is_whitelisted(Path::new("/home/folder/deep/er")));
        assert!(!wl.is_whitelisted(Path::new("/home/folder2")));
        assert!(!wl.is_whitelisted(Path::new("/home/fold")));
        assert!(!wl.is_whitelisted(Path::new("/home")));
    }

    #[cfg(unix)]
    #[test]
    fn folder_entry_with_trailing_separator() {
        let wl = folder("/home/folder/");
        assert!(wl.is_whitelisted(Path::new("/home/folder/file")));
        assert!(!wl.is_whitelisted(Path::new("/home/folder2")));
    }

    #[cfg(unix)]
    #[test]
    fn file_entry_is_exact() {
        let wl = Whitelist::new(&[WhitelistEntry {
            kind: WhitelistKind::File,
            path: "/home/user/.bash_history".into(),
        }]);
        assert!(wl.is_whitelisted(Path::new("/home/user/.bash_history")));
        assert!(!wl.is_whitelisted(Path::new("/home/user/.bash_history2")));
        assert!(!wl.is_whitelisted(Path::new("/home/user/.bash_history/x")));
    }

    #[cfg(unix)]
    #[test]
    fn root_folder_covers_everything() {
        assert!(folder("/").is_whitelisted(Path::new("/tmp/x")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn case_matters_on_linux() {
        assert!(!folder("/home/Folder").is_whitelisted(Path::new("/home/folder/x")));
    }

    #[cfg(unix)]
    #[test]
    fn doubled_separators_do_not_escape_folder() {
        let wl = folder("/home/folder");
        assert!(wl.is_whitelisted(Path::new("/home//folder/file")));
        assert!(wl.is_whitelisted(Path::new("/home/folder//deep/./file")));
        assert!(!wl.is_whitelisted(Path::new("/home//folder2/file")));
    }

    #[test]
    fn home_relative_entry_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let wl = folder("~/keep");
        assert!(wl.is_whitelisted(&home.join("keep").join("file")));
        assert!(!wl.is_whitelisted(&home.join("keeper")));
        assert_eq!(wl.entries()[0].path, "~/keep");
    }

    #[cfg(unix)]
    #[test]
    fn env_entry_is_expanded() {
        std::env::set_var("CACHESWEEP_WHITELIST_TEST_ROOT", "/srv/data");
        let wl = Whitelist::new(&[WhitelistEntry {
            kind: WhitelistKind::File,
            path: "$CACHESWEEP_WHITELIST_TEST_ROOT/db.sqlite".into(),
        }]);
        assert!(wl.is_whitelisted(Path::new("/srv/data/db.sqlite")));
    }

    #[test]
    fn set_replaces_entries() {
        let mut wl = folder("/a");
        wl.set(&[]);
        assert!(wl.is_empty());
    }

    #[cfg(unix)]
    proptest! {
        #[test]
        fn sibling_with_suffix_is_never_whitelisted(suffix in "[a-z0-9]{1,8}") {
            let wl = folder("/home/folder");
            let sibling = format!("/home/folder{}", suffix);
            let child = format!("/home/folder/{}", suffix);
            prop_assert!(!wl.is_whitelisted(Path::new(&sibling)));
            prop_assert!(wl.is_whitelisted(Path::new(&child)));
        }
    }
}
