//! Switch command - replace the active credential file with a preset.

use anyhow::Result;
use clap::Args;

use opm_store::{PresetManager, StorePaths};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the switch command.
#[derive(Args)]
pub struct SwitchArgs {
    /// Preset to switch to.
    pub name: String,

    /// Skip the pre-switch backup of the active file.
    #[arg(long)]
    pub no_backup: bool,

    /// Comma-separated services to apply from the preset, preserving every
    /// other service currently active (e.g. "openai" or "openai,google").
    #[arg(long, value_name = "SERVICES")]
    pub only: Option<String>,
}

/// Runs the switch command.
pub async fn run(args: &SwitchArgs, cli: &Cli) -> Result<()> {
    let mut manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;

    let auto_backup = !args.no_backup;
    let report = match parse_service_selection(args.only.as_deref()) {
        // The store validates the selection against the preset; an empty or
        // unknown selection surfaces as InvalidSelection.
        Some(services) => {
            manager
                .switch_selective(&args.name, &services, auto_backup)
                .await?
        }
        None => manager.switch(&args.name, auto_backup).await?,
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_switch_report(&report));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_switch_report(&report)?);
        }
    }

    Ok(())
}

/// Splits a `--only` list into service names, dropping empty segments.
fn parse_service_selection(arg: Option<&str>) -> Option<Vec<String>> {
    arg.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

// ============================================================================
// Tests
// ============================================================================
