//! Error types for the media organizer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media organizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media organizer
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read file metadata for {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite existing file: {path}")]
    TargetExists { path: PathBuf },

    #[error("File name is not valid UTF-8: {path}")]
    InvalidFileName { path: PathBuf },

    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// Whether this error should stop the invocation before any scanning happens
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_display() {
        let err = Error::Usage("You must supply a source (-s) and destination (-d)".into());
        assert!(err.is_usage());
        assert_eq!(
            err.to_string(),
            "You must supply a source (-s) and destination (-d)"
        );
    }

    #[test]
    fn test_target_exists_is_not_usage() {
        let err = Error::TargetExists {
            path: PathBuf::from("/dest/2021/2021-06/20210615_photo.jpg"),
        };
        assert!(!err.is_usage());
        assert!(err.to_string().contains("20210615_photo.jpg"));
    }
}
