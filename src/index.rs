//! Index of media files already present under the destination root
//!
//! Files are keyed by bare file name so that copies a user moved into a
//! custom folder (`vacation/`, `best of 2020/`...) are still recognized.
//! When two destination files share a name, the last one walked wins and
//! the other is invisible to duplicate detection.

use crate::media::{MediaClassifier, MediaFile};
use crate::scan::{TreeEntry, walk_tree};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{Level, debug, info, span, warn};

/// What the index knows about one destination file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub size: u64,
    pub effective: DateTime<Local>,
    pub path: PathBuf,
}

impl IndexEntry {
    /// Same size and effective timestamp
    pub fn matches(&self, size: u64, effective: &DateTime<Local>) -> bool {
        self.size == size && self.effective == *effective
    }
}

/// Outcome of a full destination scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Media files indexed (same-name files count each time they are seen)
    pub indexed: usize,
    /// Entries that could not be read
    pub errors: usize,
    pub duration: Duration,
}

impl IndexSummary {
    /// Indexing rate, when the scan took measurable time
    pub fn files_per_sec(&self) -> Option<f64> {
        let secs = self.duration.as_secs_f64();
        (secs >= 0.1).then(|| self.indexed as f64 / secs)
    }
}

/// File name to destination file mapping, mutated as a run copies files
#[derive(Debug, Clone, Default)]
pub struct DestinationIndex {
    entries: HashMap<String, IndexEntry>,
}

impl DestinationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `root` recursively and index every image and video
    ///
    /// A missing root yields an empty index. Unreadable entries are logged
    /// and counted, never fatal.
    pub fn build(
        root: &Path,
        classifier: &MediaClassifier,
        exclude_dirs: &[PathBuf],
    ) -> (Self, IndexSummary) {
        let _span = span!(Level::INFO, "index_destination", ?root).entered();
        info!("--- Indexing destination files ----------");

        let start = Instant::now();
        let mut index = Self::new();
        let mut summary = IndexSummary::default();

        if !root.exists() {
            info!(?root, "Destination does not exist yet, nothing to index");
            return (index, summary);
        }

        for entry in walk_tree(root, exclude_dirs) {
            match entry {
                TreeEntry::Directory(dir) => debug!(path = %dir.display(), "Indexing directory"),
                TreeEntry::File(path) => {
                    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                        warn!(?path, "Skipping file with non UTF-8 name");
                        summary.errors += 1;
                        continue;
                    };
                    let kind = classifier.classify(name);
                    if !kind.is_media() {
                        continue;
                    }

                    match MediaFile::from_path(&path, kind) {
                        Ok(file) => {
                            summary.indexed += 1;
                            index.insert(
                                file.name,
                                IndexEntry {
                                    size: file.size,
                                    effective: file.effective,
                                    path,
                                },
                            );
                        }
                        Err(e) => {
                            warn!(?path, error = %e, "Failed to index destination file");
                            summary.errors += 1;
                        }
                    }
                }
                TreeEntry::Unreadable(e) => {
                    warn!(error = %e, "Failed to read destination entry");
                    summary.errors += 1;
                }
            }
        }

        summary.duration = start.elapsed();
        match summary.files_per_sec() {
            Some(rate) => info!(
                indexed = summary.indexed,
                duration_secs = %format_args!("{:.1}", summary.duration.as_secs_f64()),
                files_per_sec = rate.round(),
                "Destination media files indexed"
            ),
            None => info!(indexed = summary.indexed, "Destination media files indexed"),
        }

        (index, summary)
    }

    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.get(name)
    }

    /// Entry for `name`, if its size and effective timestamp match
    pub fn find_match(&self, name: &str, size: u64, effective: &DateTime<Local>) -> Option<&IndexEntry> {
        self.get(name).filter(|entry| entry.matches(size, effective))
    }

    /// Insert or replace the entry for `name`
    pub fn insert(&mut self, name: String, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.insert(name, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
