//! Platform-specific file metadata.
//!
//! Creation time is best effort: macOS and Windows record it, Linux only
//! reports it through `statx` on file systems that keep a birth time, and
//! some platforms never do. When it is missing the modification time is
//! the only input left to the effective timestamp.

use chrono::{DateTime, Local};
use std::fs::Metadata;
use std::io;
use std::path::Path;

/// The metadata we need from a single `stat` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Exact size in bytes
    pub size: u64,
    /// Creation (birth) time, if the platform and file system provide one
    pub created: Option<DateTime<Local>>,
    /// Last modification time
    pub modified: DateTime<Local>,
    /// Last access time, kept so copies can carry it over
    pub accessed: Option<DateTime<Local>>,
}

impl FileStat {
    /// Read size and timestamps for `path`, following symlinks
    pub fn read(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Self::from_metadata(&metadata)
    }

    /// Extract size and timestamps from already fetched metadata
    pub fn from_metadata(metadata: &Metadata) -> io::Result<Self> {
        let modified = metadata.modified()?;
        Ok(Self {
            size: metadata.len(),
            created: creation_time(metadata),
            modified: modified.into(),
            accessed: metadata.accessed().ok().map(Into::into),
        })
    }
}

/// Creation time, where the platform and file system record one
///
/// `Metadata::created` reports `Unsupported` rather than guessing, so a
/// missing value here is never a stand-in.
fn creation_time(metadata: &Metadata) -> Option<DateTime<Local>> {
    metadata.created().ok().map(Into::into)
}
