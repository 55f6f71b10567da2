//! Destination folder layout
//!
//! Images: `YYYY/YYYY-MM/`. Videos: `videos/YYYY/`. File names are kept as is.

use crate::media::MediaKind;
use chrono::{DateTime, Datelike, Local};
use std::path::{Path, PathBuf};

/// Canonical folder for a file, relative to the destination root
///
/// Returns `None` for [`MediaKind::Other`], which is never placed.
pub fn relative_folder(ts: &DateTime<Local>, kind: MediaKind) -> Option<PathBuf> {
    let year = ts.year();
    match kind {
        MediaKind::Image => Some(
            PathBuf::from(year.to_string()).join(format!("{}-{:02}", year, ts.month())),
        ),
        MediaKind::Video => Some(PathBuf::from("videos").join(year.to_string())),
        MediaKind::Other => None,
    }
}

/// Canonical folder and file path under `dest_root`
pub fn destination(
    dest_root: &Path,
    ts: &DateTime<Local>,
    kind: MediaKind,
    filename: &str,
) -> Option<(PathBuf, PathBuf)> {
    let folder = dest_root.join(relative_folder(ts, kind)?);
    let path = folder.join(filename);
    Some((folder, path))
}
