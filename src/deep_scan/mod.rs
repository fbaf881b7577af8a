//! Shared recursive filename search.
//!
//! Many rules can ask for "every file named X under root R". Rather than
//! walk R once per rule, each rule registers its `(root, regex)` pair and a
//! single walk per distinct root tests every file name against every regex
//! registered for that root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use regex::Regex;
use walkdir::WalkDir;

/// Default wall-clock gap between liveness markers.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// One rule's contribution to the shared walk.
#[derive(Debug, Clone)]
pub struct DeepScanRequest {
    pub root: PathBuf,
    pub regex: Regex,
    /// Whether hits from this search should be shredded.
    pub shred: bool,
}

/// A file matched by at least one registered regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepHit {
    pub path: PathBuf,
    pub shred: bool,
}

/// Item produced by a running scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Still walking; nothing to report yet.
    Progress,
    Found(DeepHit),
}

/// Accumulates registrations for one engine run.
#[derive(Debug, Clone)]
pub struct DeepScanner {
    searches: BTreeMap<PathBuf, Vec<(Regex, bool)>>,
    interval: Duration,
}

impl DeepScanner {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_PROGRESS_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            searches: BTreeMap::new(),
            interval,
        }
    }

    /// Register a regex under `root`. Repeated registrations accumulate.
    pub fn add_search(&mut self, root: impl Into<PathBuf>, regex: Regex) {
        self.add_request(DeepScanRequest {
            root: root.into(),
            regex,
            shred: false,
        });
    }

    pub fn add_request(&mut self, request: DeepScanRequest) {
        tracing::debug!(
            root = %request.root.display(),
            regex = %request.regex,
            "deep scan search added"
        );
        self.searches
            .entry(request.root)
            .or_default()
            .push((request.regex, request.shred));
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.searches.keys().map(PathBuf::as_path)
    }

    /// Walk every registered root once.
    pub fn scan(&self) -> DeepScan {
        self.clone().into_scan()
    }

    pub fn into_scan(self) -> DeepScan {
        DeepScan {
            roots: self.searches.into_iter(),
            current: None,
            interval: self.interval,
            last_yield: Instant::now(),
        }
    }
}

impl Default for DeepScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over one scan. Dropping it abandons the walk.
pub struct DeepScan {
    roots: std::collections::btree_map::IntoIter<PathBuf, Vec<(Regex, bool)>>,
    current: Option<(walkdir::IntoIter, Vec<(Regex, bool)>)>,
    interval: Duration,
    last_yield: Instant,
}

impl Iterator for DeepScan {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        loop {
            if self.current.is_none() {
                let (root, regexes) = self.roots.next()?;
                tracing::debug!(root = %root.display(), "deep scan walking root");
                let walker = WalkDir::new(root)
                    .min_depth(1)
                    .follow_links(false)
                    .into_iter();
                self.current = Some((walker, regexes));
            }
            let (walker, regexes) = self.current.as_mut()?;

            let entry = match walker.next() {
                None => {
                    self.current = None;
                    continue;
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "deep scan skipping unreadable entry");
                    continue;
                }
                Some(Ok(entry)) => entry,
            };

            if !entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy();
                let mut hit: Option<bool> = None;
                for (re, shred) in regexes.iter() {
                    if re.is_match(&name) {
                        hit = Some(hit.unwrap_or(false) || *shred);
                    }
                }
                if let Some(shred) = hit {
                    self.last_yield = Instant::now();
                    return Some(ScanEvent::Found(DeepHit {
                        path: entry.into_path(),
                        shred,
                    }));
                }
            }

            if self.last_yield.elapsed() >= self.interval {
                self.last_yield = Instant::now();
                return Some(ScanEvent::Progress);
            }
        }
    }
}
