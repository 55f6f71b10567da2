//! Configuration types for the media organizer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How a name collision with different content is disambiguated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionStrategy {
    /// Rename the source file with a date prefix, then copy it under the new name.
    /// Later runs see the prefixed source name and treat it as already organized.
    #[default]
    RenameSource,
    /// Copy under the date-prefixed name but leave the source file untouched
    RenameCopy,
}

/// What a single invocation will do, once the configuration is validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Copy media from `source` into the dated tree under `dest`
    Organize { source: PathBuf, dest: PathBuf },
    /// Prefix media files under `source` with their capture date, in place
    Rename { source: PathBuf },
}

/// Configuration for the media organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the tree to scan
    pub source: Option<PathBuf>,

    /// Root of the tree to populate (organize mode only)
    pub dest: Option<PathBuf>,

    /// Perform copies, renames and directory creation. When false the run is a dry run.
    pub execute: bool,

    /// Per-file and per-directory narration
    pub verbose: bool,

    /// Rename source files with a date prefix instead of copying them
    pub rename_with_ts_prefix: bool,

    /// Directories to skip while walking (absolute paths or bare folder names)
    pub exclude_dirs: Vec<PathBuf>,

    /// Extensions treated as images
    pub image_extensions: Vec<String>,

    /// Extensions treated as videos. `mp3` is deliberately part of this list.
    pub video_extensions: Vec<String>,

    /// Name collision handling
    pub collision: CollisionStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            dest: None,
            execute: false,
            verbose: false,
            rename_with_ts_prefix: false,
            exclude_dirs: vec![],
            image_extensions: vec![
                "jpg".into(),
                "jpeg".into(),
                "gif".into(),
                "png".into(),
                "heic".into(),
            ],
            video_extensions: vec![
                "mp3".into(),
                "mp4".into(),
                "mov".into(),
                "avi".into(),
                "3gp".into(),
            ],
            collision: CollisionStrategy::default(),
        }
    }
}

impl Config {
    /// Validate the configuration and decide which engine runs
    ///
    /// Rename mode only needs a source. Organize mode needs both a source
    /// and a destination, and the destination may not live inside the source.
    pub fn run_mode(&self) -> Result<RunMode> {
        let source = match (&self.source, self.rename_with_ts_prefix, &self.dest) {
            (Some(source), true, _) => {
                ensure_source_exists(source)?;
                return Ok(RunMode::Rename {
                    source: source.clone(),
                });
            }
            (Some(source), false, Some(_)) => source,
            _ => {
                return Err(Error::Usage(
                    "You must supply a source (-s) and destination (-d)".into(),
                ));
            }
        };

        ensure_source_exists(source)?;
        let dest = self.dest.clone().unwrap_or_default();

        let nested = dest.starts_with(source)
            || matches!(
                (fs::canonicalize(source), fs::canonicalize(&dest)),
                (Ok(source_abs), Ok(dest_abs)) if dest_abs.starts_with(&source_abs)
            );
        if nested {
            return Err(Error::Usage(format!(
                "Destination {} is inside source {}",
                dest.display(),
                source.display()
            )));
        }

        Ok(RunMode::Organize {
            source: source.clone(),
            dest,
        })
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Media Organizer Configuration File
# This file uses TOML format (https://toml.io)
# Command line flags override anything set here.

# Tree to scan for photos and videos
source = "/Volumes/Camera/DCIM"

# Tree to populate: images go to YYYY/YYYY-MM/, videos to videos/YYYY/
dest = "/Users/me/Pictures/Library"

# Actually copy/rename files. Leave false for a dry run.
execute = false

# Per-file narration
verbose = false

# Rename files under `source` with a YYYYMMDD_ prefix instead of copying
rename_with_ts_prefix = false

# Folders skipped while walking either tree
# Bare names match anywhere, absolute paths match that subtree only
exclude_dirs = [".thumbnails", "@eaDir"]

# A file sharing a name with a different file at its destination is copied
# under a YYYYMMDD_ prefixed name. "rename-source" also renames the source
# file; "rename-copy" leaves the source untouched.
collision = "rename-source"

image_extensions = ["jpg", "jpeg", "gif", "png", "heic"]
video_extensions = ["mp3", "mp4", "mov", "avi", "3gp"]
"#
        .to_string()
    }
}

fn ensure_source_exists(source: &Path) -> Result<()> {
    if source.is_dir() {
        Ok(())
    } else {
        Err(Error::Usage(format!(
            "Source directory does not exist: {}",
            source.display()
        )))
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_extensions() {
        let config = Config::default();
        assert_eq!(config.image_extensions, ["jpg", "jpeg", "gif", "png", "heic"]);
        assert_eq!(config.video_extensions, ["mp3", "mp4", "mov", "avi", "3gp"]);
        assert!(!config.execute);
        assert_eq!(config.collision, CollisionStrategy::RenameSource);
    }

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml_str(&Config::sample_config()).unwrap();
        assert_eq!(config.source, Some(PathBuf::from("/Volumes/Camera/DCIM")));
        assert_eq!(config.exclude_dirs.len(), 2);
        assert_eq!(config.collision, CollisionStrategy::RenameSource);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str("collision = \"rename-copy\"\nexecute = true\n").unwrap();
        assert_eq!(config.collision, CollisionStrategy::RenameCopy);
        assert!(config.execute);
        assert!(config.source.is_none());
        assert_eq!(config.image_extensions.len(), 5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "execute = \"maybe\"").unwrap();
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_run_mode_requires_source_and_dest() {
        let mut config = Config::default();
        assert!(config.run_mode().unwrap_err().is_usage());

        let dir = TempDir::new().unwrap();
        config.source = Some(dir.path().to_path_buf());
        assert!(config.run_mode().unwrap_err().is_usage());
    }

    #[test]
    fn test_run_mode_rename_ignores_dest() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            source: Some(dir.path().to_path_buf()),
            rename_with_ts_prefix: true,
            ..Config::default()
        };
        assert_eq!(
            config.run_mode().unwrap(),
            RunMode::Rename {
                source: dir.path().to_path_buf()
            }
        );
    }

    #[test]
    fn test_run_mode_organize() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let config = Config {
            source: Some(src.path().to_path_buf()),
            dest: Some(dst.path().to_path_buf()),
            ..Config::default()
        };
        assert_eq!(
            config.run_mode().unwrap(),
            RunMode::Organize {
                source: src.path().to_path_buf(),
                dest: dst.path().to_path_buf(),
            }
        );
    }

    #[test]
    fn test_run_mode_rejects_dest_inside_source() {
        let src = TempDir::new().unwrap();
        let config = Config {
            source: Some(src.path().to_path_buf()),
            dest: Some(src.path().join("sorted")),
            ..Config::default()
        };
        assert!(config.run_mode().unwrap_err().is_usage());
    }

    #[test]
    fn test_run_mode_rejects_missing_source() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            source: Some(dir.path().join("missing")),
            rename_with_ts_prefix: true,
            ..Config::default()
        };
        assert!(config.run_mode().unwrap_err().is_usage());
    }
}
