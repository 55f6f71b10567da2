//! Media Organizer - sort photos and videos into dated folders
//!
//! Copies media from a source tree into `YYYY/YYYY-MM/` (images) and
//! `videos/YYYY/` (videos) under a destination, or renames media in place
//! with a `YYYYMMDD_` prefix.

use anyhow::Result;
use clap::Parser;
use media_organizer::{
    Cli, Config, FileResult, ProcessingStatus, Processor, RenameResult, RenameStatus, Renamer,
    RunMode,
};
use std::path::Path;
use tracing::{Level, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored terminal output for parameters and statistics.

    use crossterm::{
        ExecutableCommand, queue,
        style::{Color, Print, StyledContent, Stylize, style},
    };
    use std::fmt::Display;
    use std::io::{Write, stdout};

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    /// Section banner, e.g. `--- Statistics ----------`
    pub fn print_section(title: &str) {
        let _ = stdout().execute(Print(format!(
            "{}\n",
            style(format!("--- {} ----------", title)).bold()
        )));
    }

    /// Yellow `⚠` line, used for the dry-run notice
    pub fn print_warning(msg: &str) {
        emit_line("", style("⚠").with(CliTheme::WARNING).bold(), " ", style(msg));
    }

    /// Red `✗` line for usage errors and the failed-file count
    pub fn print_error(msg: &str) {
        emit_line("", style("✗").with(CliTheme::ERROR).bold(), " ", style(msg));
    }

    /// Dim follow-up line under an error
    pub fn print_hint(msg: &str) {
        emit_line("", style("→").with(CliTheme::HINT), " ", style(msg));
    }

    /// `key: value` line; the value is bold unless a color is given
    pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
        let value_styled = match value_color {
            Some(color) => style(value).with(color),
            None => style(value).bold(),
        };
        emit_line("  ", style(key).with(CliTheme::HINT), ": ", value_styled);
    }

    /// Statistic line; `indent` nests sub-counts under their total
    pub fn print_stat(key: &str, value: usize, color: Color, indent: usize) {
        emit_line(
            &"  ".repeat(indent + 1),
            style(key).with(CliTheme::HINT),
            ": ",
            style(value.to_string()).with(color).bold(),
        );
    }

    /// One per-file line: status icon, source path, then where it went or why it failed
    pub fn print_result(status_icon: &str, status_color: Color, source: &str, dest_or_msg: &str) {
        let head = format!("{} ", style(status_icon).with(status_color).bold());
        emit_line(
            &format!("  {}", head),
            style(source).italic(),
            " ",
            style(dest_or_msg).with(CliTheme::HINT),
        );
    }

    /// Queue `lead`, `first`, `sep`, `second` and a newline, then flush once
    fn emit_line(lead: &str, first: StyledContent<&str>, sep: &str, second: StyledContent<impl Display>) {
        let mut out = stdout().lock();
        let _ = queue!(out, Print(lead), Print(first), Print(sep), Print(second), Print("\n"));
        let _ = out.flush();
    }

    /// Empty spacer line
    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample_config {
        print!("{}", Config::sample_config());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let _guard = setup_logging(&cli, config.verbose)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Media Organizer starting");
    print_parameters(&config);

    let mode = match config.run_mode() {
        Ok(mode) => mode,
        Err(e) if e.is_usage() => {
            cli_output::print_error(&e.to_string());
            cli_output::print_hint("Run with --help to see the available options");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    match mode {
        RunMode::Organize { .. } => run_organize(&config)?,
        RunMode::Rename { .. } => run_rename(&config)?,
    }

    if !config.execute {
        cli_output::print_blank();
        cli_output::print_warning("Dry run: nothing was changed. Pass --execute (-x) to apply.");
    }

    Ok(())
}

/// Copy media into the dated destination tree and print statistics
fn run_organize(config: &Config) -> Result<()> {
    use cli_output::*;

    let mut processor = Processor::new(config)?;
    let results = processor.run();
    let stats = processor.stats();

    if config.verbose {
        print_section("Files");
        for result in &results {
            print_transfer_result(result, config.execute);
        }
    }

    print_section("Statistics");
    print_stat("Source files found", stats.files_found, CliTheme::SUCCESS, 0);
    print_stat("Image", stats.images, CliTheme::SUCCESS, 1);
    print_stat("Video", stats.videos, CliTheme::SUCCESS, 1);
    print_stat("Destination files indexed", stats.indexed, CliTheme::ACCENT, 0);
    print_stat("Dupes found at dest", stats.duplicates(), CliTheme::ACCENT, 0);
    print_stat("Standard folders", stats.standard_duplicates, CliTheme::ACCENT, 1);
    print_stat("Custom folders", stats.custom_folder_duplicates, CliTheme::ACCENT, 1);
    print_stat("Name collisions", stats.name_collisions, CliTheme::WARNING, 0);
    print_stat("Dirs created", stats.dirs_created, CliTheme::SUCCESS, 0);
    print_stat("Files copied", stats.files_copied, CliTheme::SUCCESS, 0);
    print_stat("Errors", stats.errors, CliTheme::ERROR, 0);

    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.status == ProcessingStatus::Failed)
        .collect();
    if !failed.is_empty() {
        print_blank();
        print_error(&format!("{} files failed", failed.len()));
        for result in failed {
            print_key_value(
                &result.source.display().to_string(),
                result.error.as_deref().unwrap_or("unknown error"),
                Some(CliTheme::ERROR),
            );
        }
    }

    Ok(())
}

fn print_transfer_result(result: &FileResult, execute: bool) {
    use cli_output::*;

    let source = result.source.display().to_string();
    let dest = result
        .destination
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let arrow = if execute { "→" } else { "~>" };

    match result.status {
        ProcessingStatus::Copied => {
            print_result("✓", CliTheme::SUCCESS, &source, &format!("{} {}", arrow, dest))
        }
        ProcessingStatus::Disambiguated => {
            print_result("±", CliTheme::WARNING, &source, &format!("{} {}", arrow, dest))
        }
        ProcessingStatus::Duplicate => {
            print_result("≡", CliTheme::ACCENT, &source, &format!("duplicate of {}", dest))
        }
        ProcessingStatus::DuplicateInCustomFolder => print_result(
            "≡",
            CliTheme::ACCENT,
            &source,
            &format!("duplicate in custom folder: {}", dest),
        ),
        ProcessingStatus::Failed => print_result(
            "✗",
            CliTheme::ERROR,
            &source,
            result.error.as_deref().unwrap_or("unknown error"),
        ),
    }
}

/// Rename media in place and print statistics
fn run_rename(config: &Config) -> Result<()> {
    use cli_output::*;

    let mut renamer = Renamer::new(config)?;
    let results = renamer.run();
    let stats = renamer.stats();

    if config.verbose {
        print_section("Files");
        for result in &results {
            print_rename_result(result);
        }
    }

    print_section("Statistics");
    print_stat("Source files found", stats.files_found, CliTheme::SUCCESS, 0);
    print_stat("Files renamed", stats.renamed, CliTheme::SUCCESS, 0);
    print_stat("Already prefixed", stats.already_prefixed, CliTheme::ACCENT, 0);
    print_stat("Errors", stats.errors, CliTheme::ERROR, 0);

    Ok(())
}

fn print_rename_result(result: &RenameResult) {
    use cli_output::*;

    let source = result.source.display().to_string();
    match result.status {
        RenameStatus::Renamed => {
            let to = result
                .renamed_to
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            print_result("✓", CliTheme::SUCCESS, &source, &format!("→ {}", to));
        }
        RenameStatus::AlreadyPrefixed => {
            print_result("⊘", CliTheme::WARNING, &source, "appears to have been renamed previously")
        }
        RenameStatus::Failed => print_result(
            "✗",
            CliTheme::ERROR,
            &source,
            result.error.as_deref().unwrap_or("unknown error"),
        ),
    }
}

/// Echo the effective input parameters
fn print_parameters(config: &Config) {
    use cli_output::*;

    let show = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".into())
    };

    print_section("Input Parameters");
    print_key_value("Source", &show(&config.source), None);
    print_key_value("Dest", &show(&config.dest), None);
    print_key_value("Verbose", &config.verbose.to_string(), None);
    print_key_value("Execute", &config.execute.to_string(), None);
    print_key_value("Rename", &config.rename_with_ts_prefix.to_string(), None);
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref config_path) => {
            let file_config = Config::load_from_file(config_path)?;
            cli.merge_with_config(file_config)
        }
        None => cli.to_config(),
    };
    Ok(config)
}

/// Console logging to stdout, plus an optional log file
fn setup_logging(cli: &Cli, verbose: bool) -> Result<Option<WorkerGuard>> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout));

    let Some(ref log_path) = cli.log_file else {
        subscriber.init();
        return Ok(None);
    };

    let file = open_log_file(log_path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(Some(guard))
}

fn open_log_file(log_path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    Ok(std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?)
}
