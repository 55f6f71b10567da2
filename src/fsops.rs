//! File system side effects
//!
//! Nothing here deletes or overwrites a file.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use filetime::FileTime;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

const COPY_BUFFER: usize = 256 * 1024;

/// Create `path` and its parents unless it already exists
///
/// Returns whether anything was created.
pub fn create_dir_if_absent(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(?path, "Created directory");
    Ok(true)
}

/// Copy `source` to a new file at `dest`, then stamp its times
///
/// `modified` becomes the copy's modification time. Passing the source's
/// effective timestamp makes the copy resolve to the same effective
/// timestamp even where creation time cannot be written.
pub fn copy_with_times(
    source: &Path,
    dest: &Path,
    modified: &DateTime<Local>,
    accessed: Option<&DateTime<Local>>,
) -> Result<()> {
    let copy_err = |source_err| Error::Copy {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: source_err,
    };

    let src_file = File::open(source).map_err(copy_err)?;
    let dest_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::TargetExists {
                path: dest.to_path_buf(),
            },
            _ => copy_err(e),
        })?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER, dest_file);

    let mut buffer = vec![0u8; COPY_BUFFER];
    loop {
        let bytes_read = reader.read(&mut buffer).map_err(copy_err)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read]).map_err(copy_err)?;
    }
    writer.flush().map_err(copy_err)?;
    drop(writer);

    let mtime = to_file_time(modified);
    let atime = accessed.map(to_file_time).unwrap_or(mtime);
    filetime::set_file_times(dest, atime, mtime).map_err(copy_err)?;

    Ok(())
}

/// Rename `from` to `to`, refusing to replace an existing file
pub fn rename_no_clobber(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        return Err(Error::TargetExists {
            path: to.to_path_buf(),
        });
    }
    fs::rename(from, to).map_err(|source| Error::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn to_file_time(ts: &DateTime<Local>) -> FileTime {
    FileTime::from_unix_time(ts.timestamp(), ts.timestamp_subsec_nanos())
}
