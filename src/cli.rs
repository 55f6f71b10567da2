//! CLI argument parsing with clap

use crate::config::{CollisionStrategy, Config};
use clap::Parser;
use std::path::PathBuf;

/// Media Organizer - sort photos and videos into dated folders
///
/// Copies images into YYYY/YYYY-MM/ and videos into videos/YYYY/ under the
/// destination, skipping files that already exist there (even in custom
/// folders). Nothing is changed unless --execute is given.
#[derive(Parser, Debug, Default)]
#[command(name = "media-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; flags override them.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Source folder to find photos in
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Destination folder to put dated folders in
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Execute mode, do real copies and renames
    #[arg(short = 'x', long)]
    pub execute: bool,

    /// Verbose mode, narrate every directory and file
    #[arg(short, long)]
    pub verbose: bool,

    /// Rename source files with a timestamp prefix instead of copying
    #[arg(short, long = "rename_with_ts_prefix")]
    pub rename_with_ts_prefix: bool,

    /// How to disambiguate a name clash with a different file
    #[arg(long, value_enum)]
    pub collision: Option<CollisionStrategy>,

    /// Directory to skip while walking (repeatable)
    #[arg(long = "exclude", value_name = "DIR")]
    pub exclude: Vec<PathBuf>,

    /// Also write the log to this file
    #[arg(long, env = "MEDIA_ORGANIZER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Write the log file as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub sample_config: bool,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref source) = self.source {
            config.source = Some(source.clone());
        }
        if let Some(ref dest) = self.dest {
            config.dest = Some(dest.clone());
        }
        if self.execute {
            config.execute = true;
        }
        if self.verbose {
            config.verbose = true;
        }
        if self.rename_with_ts_prefix {
            config.rename_with_ts_prefix = true;
        }
        if let Some(collision) = self.collision {
            config.collision = collision;
        }
        config.exclude_dirs.extend(self.exclude.iter().cloned());

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
