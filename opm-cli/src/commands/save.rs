//! Save command - snapshot the active credential file as a preset.

use anyhow::Result;
use clap::Args;

use opm_store::{PresetManager, StorePaths};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the save command.
#[derive(Args)]
pub struct SaveArgs {
    /// Preset name. Becomes the file name, so it must be filesystem-safe
    /// (letters, digits, spaces, ". _ -").
    pub name: String,

    /// Free-form description stored with the preset.
    #[arg(long, short, default_value = "")]
    pub description: String,

    /// Service to watch for quota display (repeatable; default: openai).
    #[arg(long = "watch", value_name = "SERVICE")]
    pub watch: Vec<String>,
}

/// Runs the save command.
pub async fn run(args: &SaveArgs, cli: &Cli) -> Result<()> {
    let mut manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;

    let watched = if args.watch.is_empty() {
        None
    } else {
        Some(args.watch.clone())
    };

    let preset = manager
        .save_preset(&args.name, &args.description, watched)
        .await?;

    match cli.format {
        OutputFormat::Text => {
            let services = &preset.meta.services;
            println!(
                "Saved preset '{}' ({} service{}: {})",
                preset.name,
                services.len(),
                if services.len() == 1 { "" } else { "s" },
                services.join(", ")
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_preset(&preset)?);
        }
    }

    Ok(())
}
