//! Recursive directory walking

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One step of a tree walk
#[derive(Debug)]
pub enum TreeEntry {
    /// A directory about to be descended into (including the root)
    Directory(PathBuf),
    /// A regular file, or a symlink resolving to one
    File(PathBuf),
    /// An entry that could not be read; the walk carries on past it
    Unreadable(walkdir::Error),
}

/// Walk `root` top-down, in file name order within each directory
///
/// Each directory's listing is read in full before any of its entries is
/// yielded, so renaming files while iterating does not revisit them.
pub fn walk_tree<'a>(root: &Path, exclude_dirs: &'a [PathBuf]) -> impl Iterator<Item = TreeEntry> + 'a {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            !(e.depth() > 0 && e.file_type().is_dir() && is_excluded_dir(e.path(), exclude_dirs))
        })
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_dir() => Some(TreeEntry::Directory(e.into_path())),
            Ok(e) if e.path().is_file() => Some(TreeEntry::File(e.into_path())),
            Ok(_) => None,
            Err(e) => Some(TreeEntry::Unreadable(e)),
        })
}

/// Check if a directory should be skipped
///
/// Absolute excludes match that subtree; bare names match a directory of
/// that name anywhere.
pub fn is_excluded_dir(path: &Path, exclude_dirs: &[PathBuf]) -> bool {
    for exclude in exclude_dirs {
        if exclude.is_absolute() {
            if path.starts_with(exclude) {
                debug!(?path, ?exclude, "Excluding directory (absolute path match)");
                return true;
            }
        } else if path.file_name().is_some_and(|name| Some(name) == exclude.file_name()) {
            debug!(?path, ?exclude, "Excluding directory (folder name match)");
            return true;
        }
    }

    false
}
