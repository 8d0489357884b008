// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # opm - OAuth preset manager for OpenCode
//!
//! Snapshots the OpenCode credential file (`auth.json`) as named presets,
//! switches between them atomically (with a backup of whatever was active),
//! and aggregates OAuth quota across every stored credential.
//!
//! ```bash
//! # Snapshot the current auth.json as a preset
//! opm save work --description "work account"
//!
//! # Switch the active file to a preset (backs up the current state first)
//! opm switch personal
//!
//! # Switch only one service over, preserving the rest
//! opm switch work --only openai
//!
//! # Aggregate quota for every stored credential
//! opm quota
//! opm q --format json --pretty
//!
//! # Status overview (active file, detected preset, stored presets)
//! opm
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use opm_store::{StoreError, SwitchError};

use commands::{config, delete, info, list, quota, save, status, switch};

// ============================================================================
// CLI Definition
// ============================================================================

/// opm - preset manager and quota monitor for OpenCode OAuth credentials.
#[derive(Parser)]
#[command(
    name = "opm",
    about = "Manage OpenCode OAuth credential presets and monitor quota",
    long_about = r#"
opm snapshots the OpenCode credential file (auth.json) as named presets and
switches between them atomically. Before every switch the current state is
backed up, so no credential is ever lost. The quota command aggregates OAuth
usage across the active file, every stored preset, and any external
Antigravity accounts, fetching each unique token exactly once.

Examples:
  opm save work --description "work account"
  opm switch personal
  opm switch work --only openai --no-backup
  opm quota --format json
  opm list
"#,
    version
)]
pub struct Cli {
    /// Command to run. No command shows the status overview.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format.
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Store directory override (default: platform config dir + "opm").
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose (debug) logging.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress logging and non-essential output.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Snapshot the active credential file as a named preset.
    Save(save::SaveArgs),

    /// Switch the active credential file to a stored preset.
    #[command(visible_alias = "sw")]
    Switch(switch::SwitchArgs),

    /// Aggregate OAuth quota across every stored credential.
    #[command(visible_alias = "q")]
    Quota,

    /// List stored presets.
    #[command(visible_alias = "ls")]
    List,

    /// Delete a stored preset.
    Delete(delete::DeleteArgs),

    /// Show metadata and services for one preset.
    Info(info::InfoArgs),

    /// Inspect or change the opm configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with tables and progress bars.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes, one per error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// Generic error.
    Error = 1,
    /// Preset not found.
    NotFound = 2,
    /// A stored document (preset, config, active file) failed to parse.
    Corrupt = 3,
    /// Invalid preset name or service selection.
    InvalidInput = 4,
    /// Filesystem error.
    Io = 5,
}

/// Maps an error to its exit code.
///
/// Switch failures carry the underlying store error; everything not
/// recognizably a store error is the generic code.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let store_err = err
        .downcast_ref::<SwitchError>()
        .map(|e| &e.source)
        .or_else(|| err.downcast_ref::<StoreError>());

    match store_err {
        Some(StoreError::NotFound { .. }) => ExitCode::NotFound,
        Some(
            StoreError::CorruptPreset { .. }
            | StoreError::CorruptConfig { .. }
            | StoreError::CorruptActive { .. },
        ) => ExitCode::Corrupt,
        Some(StoreError::InvalidName { .. } | StoreError::InvalidSelection { .. }) => {
            ExitCode::InvalidInput
        }
        Some(
            StoreError::Io(_)
            | StoreError::MissingAuthFile { .. }
            | StoreError::VerificationFailed { .. },
        ) => ExitCode::Io,
        Some(StoreError::Serialization(_)) | None => ExitCode::Error,
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    // OPM_LOG takes precedence over the verbosity flag.
    let filter = EnvFilter::try_from_env("OPM_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("opm=debug,info")
        } else {
            EnvFilter::new("opm=warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Save(args)) => save::run(args, &cli).await,
        Some(Commands::Switch(args)) => switch::run(args, &cli).await,
        Some(Commands::Quota) => quota::run(&cli).await,
        Some(Commands::List) => list::run(&cli).await,
        Some(Commands::Delete(args)) => delete::run(args, &cli).await,
        Some(Commands::Info(args)) => info::run(args, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => status::run(&cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(exit_code_for(&e) as i32);
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
