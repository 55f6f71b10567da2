//! Transfer of media files into the dated destination tree
//!
//! Handles the core logic of:
//! - Indexing the destination once
//! - Walking the source in name order
//! - Deciding per file: copy, skip as duplicate, or copy under a date-prefixed name
//! - Creating folders and copying, only when execute is on
//!
//! Every decision and counter is computed the same way in a dry run. Files
//! and folders the run creates (or would create) are tracked so later
//! decisions see them in both modes.

use crate::config::{CollisionStrategy, Config, RunMode};
use crate::error::{Error, Result};
use crate::fsops;
use crate::index::{DestinationIndex, IndexEntry};
use crate::layout;
use crate::media::{MediaClassifier, MediaFile, MediaKind};
use crate::scan::{TreeEntry, walk_tree};
use crate::time::prefixed_name;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};

/// What to do with one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing like it at the destination yet
    Copy,
    /// Same name, size and effective timestamp at the canonical path
    StandardDuplicate,
    /// Same name, size and effective timestamp somewhere else under the destination
    DuplicateInCustomFolder { existing: PathBuf },
    /// The canonical path holds a different file with the same name
    Disambiguate { new_name: String },
}

/// Decide the fate of `file`
///
/// `canonical_exists` tells whether a file is already at its canonical
/// destination path. A missing index entry for an occupied path counts as
/// different content.
pub fn decide(file: &MediaFile, canonical_exists: bool, index: &DestinationIndex) -> Decision {
    let indexed = index.find_match(&file.name, file.size, &file.effective);

    if canonical_exists {
        if indexed.is_some() {
            Decision::StandardDuplicate
        } else {
            Decision::Disambiguate {
                new_name: prefixed_name(&file.effective, &file.name),
            }
        }
    } else if let Some(entry) = indexed {
        Decision::DuplicateInCustomFolder {
            existing: entry.path.clone(),
        }
    } else {
        Decision::Copy
    }
}

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path as discovered
    pub source: PathBuf,
    /// Where the file went, or the file it duplicates
    pub destination: Option<PathBuf>,
    pub kind: MediaKind,
    pub status: ProcessingStatus,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// Copied to its canonical path
    Copied,
    /// Copied under a date-prefixed name after a name collision
    Disambiguated,
    /// Already at its canonical path
    Duplicate,
    /// Already present in a custom folder
    DuplicateInCustomFolder,
    /// Processing failed
    Failed,
}

/// Transfer statistics
///
/// Identical for a dry run and a real run over the same trees, barring
/// I/O failures that only a real run can hit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Every file walked in the source, media or not
    pub files_found: usize,
    pub images: usize,
    pub videos: usize,
    /// Media files seen while indexing the destination
    pub indexed: usize,
    pub standard_duplicates: usize,
    pub custom_folder_duplicates: usize,
    pub name_collisions: usize,
    pub dirs_created: usize,
    pub files_copied: usize,
    pub errors: usize,
}

impl TransferStats {
    pub fn duplicates(&self) -> usize {
        self.standard_duplicates + self.custom_folder_duplicates
    }

    pub fn summary(&self) -> String {
        format!(
            "Found: {} (images: {}, videos: {}), Duplicates: {} (standard: {}, custom: {}), Collisions: {}, Dirs created: {}, Copied: {}, Errors: {}",
            self.files_found,
            self.images,
            self.videos,
            self.duplicates(),
            self.standard_duplicates,
            self.custom_folder_duplicates,
            self.name_collisions,
            self.dirs_created,
            self.files_copied,
            self.errors
        )
    }
}

/// Copies media from a source tree into the dated destination tree
#[derive(Debug)]
pub struct Processor {
    source: PathBuf,
    dest: PathBuf,
    execute: bool,
    collision: CollisionStrategy,
    classifier: MediaClassifier,
    exclude_dirs: Vec<PathBuf>,
    /// Folders created, or that would have been, during this run
    planned_dirs: HashSet<PathBuf>,
    /// Destination files written, or that would have been, during this run
    planned_files: HashSet<PathBuf>,
    stats: TransferStats,
}

impl Processor {
    /// Create a processor for an organize-mode configuration
    pub fn new(config: &Config) -> Result<Self> {
        let RunMode::Organize { source, dest } = config.run_mode()? else {
            return Err(Error::Usage(
                "Organizing needs a destination and no rename flag".into(),
            ));
        };

        Ok(Self {
            source,
            dest,
            execute: config.execute,
            collision: config.collision,
            classifier: MediaClassifier::from_config(config),
            exclude_dirs: config.exclude_dirs.clone(),
            planned_dirs: HashSet::new(),
            planned_files: HashSet::new(),
            stats: TransferStats::default(),
        })
    }

    /// Index the destination, then transfer every source file
    pub fn run(&mut self) -> Vec<FileResult> {
        let _span = span!(Level::INFO, "processor_run", execute = self.execute).entered();

        self.stats = TransferStats::default();
        self.planned_dirs.clear();
        self.planned_files.clear();

        let (mut index, summary) =
            DestinationIndex::build(&self.dest, &self.classifier, &self.exclude_dirs);
        self.stats.indexed = summary.indexed;
        self.stats.errors += summary.errors;

        let results = self.transfer(&mut index);

        info!("{}", self.stats.summary());
        results
    }

    /// Walk the source and process each file against `index`
    ///
    /// The index gains an entry for every file copied, so a later file in
    /// the same walk is compared against it.
    pub fn transfer(&mut self, index: &mut DestinationIndex) -> Vec<FileResult> {
        info!("--- Transferring files ----------");

        let source = self.source.clone();
        let exclude_dirs = self.exclude_dirs.clone();
        let mut results = Vec::new();

        for entry in walk_tree(&source, &exclude_dirs) {
            match entry {
                TreeEntry::Directory(dir) => debug!(path = %dir.display(), "Scanning directory"),
                TreeEntry::File(path) => {
                    if let Some(result) = self.process_file(path, index) {
                        results.push(result);
                    }
                }
                TreeEntry::Unreadable(e) => {
                    warn!(error = %e, "Failed to read source entry");
                    self.stats.errors += 1;
                }
            }
        }

        results
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }

    fn process_file(&mut self, path: PathBuf, index: &mut DestinationIndex) -> Option<FileResult> {
        let _file_span = span!(Level::DEBUG, "process_file", ?path).entered();
        self.stats.files_found += 1;

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            let err = Error::InvalidFileName { path: path.clone() };
            warn!(error = %err, "Skipping file");
            self.stats.errors += 1;
            return Some(FileResult {
                source: path,
                destination: None,
                kind: MediaKind::Other,
                status: ProcessingStatus::Failed,
                error: Some(err.to_string()),
            });
        };

        let kind = self.classifier.classify(name);
        match kind {
            MediaKind::Image => self.stats.images += 1,
            MediaKind::Video => self.stats.videos += 1,
            MediaKind::Other => return None,
        }

        let file = match MediaFile::from_path(&path, kind) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "Failed to read source file");
                self.stats.errors += 1;
                return Some(FileResult {
                    source: path,
                    destination: None,
                    kind,
                    status: ProcessingStatus::Failed,
                    error: Some(e.to_string()),
                });
            }
        };

        let (folder, dest_path) = layout::destination(&self.dest, &file.effective, kind, &file.name)?;
        debug!(
            dest_folder = %folder.display(),
            dest_path = %dest_path.display(),
            effective = %file.effective,
            "Media file"
        );

        let result = match decide(&file, self.exists(&dest_path), index) {
            Decision::StandardDuplicate => {
                debug!("Same timestamp and size as the file at its destination, not copying");
                self.stats.standard_duplicates += 1;
                file_result(&file, Some(dest_path), ProcessingStatus::Duplicate)
            }
            Decision::DuplicateInCustomFolder { existing } => {
                info!(
                    file = %file.name,
                    existing = %existing.display(),
                    "Duplicate found in a different location, not copying"
                );
                self.stats.custom_folder_duplicates += 1;
                file_result(&file, Some(existing), ProcessingStatus::DuplicateInCustomFolder)
            }
            Decision::Disambiguate { new_name } => self.copy_disambiguated(&file, &folder, new_name, index),
            Decision::Copy => self.copy_new(&file, &folder, dest_path, index),
        };
        Some(result)
    }

    fn copy_new(
        &mut self,
        file: &MediaFile,
        folder: &Path,
        dest_path: PathBuf,
        index: &mut DestinationIndex,
    ) -> FileResult {
        if let Err(e) = self.prepare_folder(folder) {
            return self.fail(file, Some(dest_path), e);
        }

        debug!(from = %file.source_path.display(), to = %dest_path.display(), "Copying file");
        if self.execute
            && let Err(e) =
                fsops::copy_with_times(&file.source_path, &dest_path, &file.effective, file.accessed.as_ref())
        {
            return self.fail(file, Some(dest_path), e);
        }

        self.stats.files_copied += 1;
        self.record(index, file.name.clone(), file, dest_path.clone());
        file_result(file, Some(dest_path), ProcessingStatus::Copied)
    }

    /// Copy under `YYYYMMDD_<name>` after a same-name, different-content clash
    fn copy_disambiguated(
        &mut self,
        file: &MediaFile,
        folder: &Path,
        new_name: String,
        index: &mut DestinationIndex,
    ) -> FileResult {
        let new_dest = folder.join(&new_name);
        debug!(new_name = %new_name, "Existing file differs, copying under a dated name");

        if self.exists(&new_dest) {
            if index.find_match(&new_name, file.size, &file.effective).is_some() {
                debug!(existing = %new_dest.display(), "Dated copy already present, not copying");
                self.stats.standard_duplicates += 1;
                return file_result(file, Some(new_dest), ProcessingStatus::Duplicate);
            }
            return self.fail(file, Some(new_dest.clone()), Error::TargetExists { path: new_dest });
        }

        let copy_from = match self.collision {
            CollisionStrategy::RenameSource => {
                let renamed = file.source_path.with_file_name(&new_name);
                if renamed.symlink_metadata().is_ok() {
                    return self.fail(file, Some(new_dest), Error::TargetExists { path: renamed });
                }
                if self.execute
                    && let Err(e) = fsops::rename_no_clobber(&file.source_path, &renamed)
                {
                    return self.fail(file, Some(new_dest), e);
                }
                debug!(renamed = %renamed.display(), "Renamed source file");
                renamed
            }
            CollisionStrategy::RenameCopy => file.source_path.clone(),
        };

        if self.execute
            && let Err(e) =
                fsops::copy_with_times(&copy_from, &new_dest, &file.effective, file.accessed.as_ref())
        {
            return self.fail(file, Some(new_dest), e);
        }

        self.stats.name_collisions += 1;
        self.stats.files_copied += 1;
        self.record(index, new_name, file, new_dest.clone());
        file_result(file, Some(new_dest), ProcessingStatus::Disambiguated)
    }

    /// Make sure `folder` exists (or would), counting it the first time
    ///
    /// A non-directory anywhere on the way down from the destination root
    /// blocks the folder in both modes.
    fn prepare_folder(&mut self, folder: &Path) -> Result<()> {
        if self.planned_dirs.contains(folder) || folder.is_dir() {
            return Ok(());
        }
        let blocker = folder
            .ancestors()
            .take_while(|p| p.starts_with(&self.dest) && !self.planned_dirs.contains(*p))
            .find(|p| p.symlink_metadata().is_ok() && !p.is_dir());
        if let Some(blocker) = blocker {
            return Err(Error::TargetExists {
                path: blocker.to_path_buf(),
            });
        }
        if self.execute {
            fsops::create_dir_if_absent(folder)?;
        }
        info!(folder = %folder.display(), "Creating new folder");
        self.planned_dirs.insert(folder.to_path_buf());
        self.stats.dirs_created += 1;
        Ok(())
    }

    /// Whether anything occupies `path`, on disk or planned by this run
    fn exists(&self, path: &Path) -> bool {
        self.planned_files.contains(path) || path.symlink_metadata().is_ok()
    }

    fn record(&mut self, index: &mut DestinationIndex, name: String, file: &MediaFile, dest: PathBuf) {
        self.planned_files.insert(dest.clone());
        index.insert(
            name,
            IndexEntry {
                size: file.size,
                effective: file.effective,
                path: dest,
            },
        );
    }

    fn fail(&mut self, file: &MediaFile, destination: Option<PathBuf>, e: Error) -> FileResult {
        error!(source = %file.source_path.display(), error = %e, "Failed to transfer file");
        self.stats.errors += 1;
        FileResult {
            source: file.source_path.clone(),
            destination,
            kind: file.kind,
            status: ProcessingStatus::Failed,
            error: Some(e.to_string()),
        }
    }
}

fn file_result(file: &MediaFile, destination: Option<PathBuf>, status: ProcessingStatus) -> FileResult {
    FileResult {
        source: file.source_path.clone(),
        destination,
        kind: file.kind,
        status,
        error: None,
    }
}
