//! Media Organizer - sort photos and videos into dated folders
//!
//! This library provides functionality for organizing photos and videos
//! based on their file system timestamps with support for:
//! - Effective capture time from creation and modification times
//! - Year/month folders for images and year folders for videos
//! - Duplicate detection by name, size and capture time, including files
//!   moved into custom folders
//! - Date-prefixed copies when different files share a name
//! - In-place date-prefix renaming
//! - Dry runs that report exactly what a real run would do

pub mod cli;
pub mod config;
pub mod error;
pub mod fsops;
pub mod index;
pub mod layout;
pub mod media;
pub mod os;
pub mod process;
pub mod rename;
pub mod scan;
pub mod time;

pub use cli::Cli;
pub use config::{CollisionStrategy, Config, ConfigError, RunMode};
pub use error::{Error, Result};
pub use index::{DestinationIndex, IndexEntry, IndexSummary};
pub use media::{MediaClassifier, MediaFile, MediaKind};
pub use process::{Decision, FileResult, Processor, ProcessingStatus, TransferStats};
pub use rename::{RenameResult, RenameStats, RenameStatus, Renamer};
