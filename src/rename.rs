//! In-place renaming with a capture date prefix
//!
//! `vacation.jpg` captured on 2019-07-04 becomes `20190704_vacation.jpg`.
//! A name that already starts with its capture year is left alone, which
//! makes repeated runs no-ops.

use crate::config::{Config, RunMode};
use crate::error::{Error, Result};
use crate::fsops;
use crate::media::{MediaClassifier, MediaFile};
use crate::scan::{TreeEntry, walk_tree};
use crate::time::{has_year_prefix, prefixed_name};
use std::path::PathBuf;
use tracing::{Level, debug, error, info, span, warn};

/// Outcome for one media file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStatus {
    Renamed,
    /// Name already starts with the capture year
    AlreadyPrefixed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct RenameResult {
    pub source: PathBuf,
    /// New path, for renamed files
    pub renamed_to: Option<PathBuf>,
    pub status: RenameStatus,
    pub error: Option<String>,
}

/// Rename statistics, identical for dry and real runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameStats {
    /// Media files walked
    pub files_found: usize,
    pub renamed: usize,
    pub already_prefixed: usize,
    pub errors: usize,
}

impl RenameStats {
    pub fn summary(&self) -> String {
        format!(
            "Found: {}, Renamed: {}, Already prefixed: {}, Errors: {}",
            self.files_found, self.renamed, self.already_prefixed, self.errors
        )
    }
}

/// Prefixes media files under a source tree with their capture date
pub struct Renamer {
    source: PathBuf,
    execute: bool,
    classifier: MediaClassifier,
    exclude_dirs: Vec<PathBuf>,
    stats: RenameStats,
}

impl Renamer {
    /// Create a renamer for a rename-mode configuration
    pub fn new(config: &Config) -> Result<Self> {
        let RunMode::Rename { source } = config.run_mode()? else {
            return Err(Error::Usage("Renaming needs --rename_with_ts_prefix".into()));
        };

        Ok(Self {
            source,
            execute: config.execute,
            classifier: MediaClassifier::from_config(config),
            exclude_dirs: config.exclude_dirs.clone(),
            stats: RenameStats::default(),
        })
    }

    pub fn run(&mut self) -> Vec<RenameResult> {
        let _span = span!(Level::INFO, "renamer_run", execute = self.execute).entered();
        info!("--- Begin renames ----------");

        self.stats = RenameStats::default();
        let source = self.source.clone();
        let exclude_dirs = self.exclude_dirs.clone();
        let mut results = Vec::new();

        for entry in walk_tree(&source, &exclude_dirs) {
            match entry {
                TreeEntry::Directory(dir) => debug!(path = %dir.display(), "Scanning directory"),
                TreeEntry::File(path) => {
                    if let Some(result) = self.rename_file(path) {
                        results.push(result);
                    }
                }
                TreeEntry::Unreadable(e) => {
                    warn!(error = %e, "Failed to read source entry");
                    self.stats.errors += 1;
                }
            }
        }

        info!("{}", self.stats.summary());
        results
    }

    pub fn stats(&self) -> &RenameStats {
        &self.stats
    }

    fn rename_file(&mut self, path: PathBuf) -> Option<RenameResult> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            let err = Error::InvalidFileName { path: path.clone() };
            warn!(error = %err, "Skipping file");
            self.stats.errors += 1;
            return Some(RenameResult {
                source: path,
                renamed_to: None,
                status: RenameStatus::Failed,
                error: Some(err.to_string()),
            });
        };

        let kind = self.classifier.classify(name);
        if !kind.is_media() {
            return None;
        }
        self.stats.files_found += 1;

        let file = match MediaFile::from_path(&path, kind) {
            Ok(file) => file,
            Err(e) => return Some(self.fail(path, None, e)),
        };

        if has_year_prefix(&file.name, &file.effective) {
            debug!(?path, "File appears to have been renamed previously");
            self.stats.already_prefixed += 1;
            return Some(RenameResult {
                source: path,
                renamed_to: None,
                status: RenameStatus::AlreadyPrefixed,
                error: None,
            });
        }

        let target = path.with_file_name(prefixed_name(&file.effective, &file.name));
        if target.symlink_metadata().is_ok() {
            let err = Error::TargetExists { path: target.clone() };
            return Some(self.fail(path, Some(target), err));
        }

        debug!(from = %path.display(), to = %target.display(), "Renaming file");
        if self.execute
            && let Err(e) = fsops::rename_no_clobber(&path, &target)
        {
            return Some(self.fail(path, Some(target), e));
        }

        self.stats.renamed += 1;
        Some(RenameResult {
            source: path,
            renamed_to: Some(target),
            status: RenameStatus::Renamed,
            error: None,
        })
    }

    fn fail(&mut self, source: PathBuf, renamed_to: Option<PathBuf>, e: Error) -> RenameResult {
        error!(source = %source.display(), error = %e, "Failed to rename file");
        self.stats.errors += 1;
        RenameResult {
            source,
            renamed_to,
            status: RenameStatus::Failed,
            error: Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use filetime::FileTime;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_media(path: &Path, ts: &DateTime<Local>) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"media").unwrap();
        filetime::set_file_mtime(path, FileTime::from_unix_time(ts.timestamp(), 0)).unwrap();
    }

    fn config(src: &Path, execute: bool) -> Config {
        Config {
            source: Some(src.to_path_buf()),
            rename_with_ts_prefix: true,
            execute,
            ..Config::default()
        }
    }

    fn run(config: &Config) -> (RenameStats, Vec<RenameResult>) {
        let mut renamer = Renamer::new(config).unwrap();
        let results = renamer.run();
        (renamer.stats().clone(), results)
    }

    #[test]
    fn test_rename_then_rerun_is_noop() {
        let src = TempDir::new().unwrap();
        let ts = Local.with_ymd_and_hms(2019, 7, 4, 15, 0, 0).unwrap();
        write_media(&src.path().join("vacation.jpg"), &ts);

        let (stats, results) = run(&config(src.path(), true));
        assert_eq!(stats.files_found, 1);
        assert_eq!(stats.renamed, 1);
        assert_eq!(results[0].status, RenameStatus::Renamed);
        assert!(src.path().join("20190704_vacation.jpg").is_file());
        assert!(!src.path().join("vacation.jpg").exists());

        let (stats, results) = run(&config(src.path(), true));
        assert_eq!(stats.files_found, 1);
        assert_eq!(stats.renamed, 0);
        assert_eq!(stats.already_prefixed, 1);
        assert_eq!(results[0].status, RenameStatus::AlreadyPrefixed);
        assert!(src.path().join("20190704_vacation.jpg").is_file());
    }

    #[test]
    fn test_year_prefix_only_counts_when_it_matches() {
        let src = TempDir::new().unwrap();
        let ts = Local.with_ymd_and_hms(2019, 7, 4, 15, 0, 0).unwrap();
        write_media(&src.path().join("2018_party.png"), &ts);

        let (stats, _) = run(&config(src.path(), true));
        assert_eq!(stats.renamed, 1);
        assert!(src.path().join("20190704_2018_party.png").is_file());
    }

    #[test]
    fn test_dry_run_counts_without_renaming() {
        let src = TempDir::new().unwrap();
        let ts = Local.with_ymd_and_hms(2020, 3, 9, 8, 0, 0).unwrap();
        write_media(&src.path().join("a.jpg"), &ts);
        write_media(&src.path().join("nested/b.mp4"), &ts);
        write_media(&src.path().join("nested/20200309_c.jpg"), &ts);
        write_media(&src.path().join("nested/notes.txt"), &ts);

        let (dry, _) = run(&config(src.path(), false));
        assert!(src.path().join("a.jpg").is_file());
        assert!(src.path().join("nested/b.mp4").is_file());

        let (real, _) = run(&config(src.path(), true));
        assert_eq!(dry, real);
        assert_eq!(real.files_found, 3);
        assert_eq!(real.renamed, 2);
        assert_eq!(real.already_prefixed, 1);
        assert!(src.path().join("nested/20200309_b.mp4").is_file());
    }

    #[test]
    fn test_existing_target_is_not_overwritten() {
        let src = TempDir::new().unwrap();
        let ts = Local.with_ymd_and_hms(2020, 3, 9, 8, 0, 0).unwrap();
        write_media(&src.path().join("a.jpg"), &ts);
        let taken = src.path().join("20200309_a.jpg");
        fs::write(&taken, b"keep me").unwrap();
        filetime::set_file_mtime(&taken, FileTime::from_unix_time(ts.timestamp(), 0)).unwrap();

        let (stats, results) = run(&config(src.path(), true));
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.renamed, 0);
        assert_eq!(stats.already_prefixed, 1);
        assert!(results.iter().any(|r| r.status == RenameStatus::Failed));
        assert!(src.path().join("a.jpg").is_file());
        assert_eq!(fs::read(&taken).unwrap(), b"keep me");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_is_counted_as_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let src = TempDir::new().unwrap();
        let ts = Local.with_ymd_and_hms(2020, 3, 9, 8, 0, 0).unwrap();
        write_media(&src.path().join(OsStr::from_bytes(b"bad\xff.jpg")), &ts);
        write_media(&src.path().join("good.jpg"), &ts);

        let (dry, _) = run(&config(src.path(), false));
        let (stats, results) = run(&config(src.path(), true));

        assert_eq!(dry, stats);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.renamed, 1);
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|r| r.status == RenameStatus::Failed && r.error.is_some()));
        assert!(src.path().join("20200309_good.jpg").is_file());
    }
}
