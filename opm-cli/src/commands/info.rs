//! Info command - show metadata and services for one preset.

use anyhow::Result;
use clap::Args;

use opm_store::{PresetManager, StorePaths};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the info command.
#[derive(Args)]
pub struct InfoArgs {
    /// Preset to inspect.
    pub name: String,
}

/// Runs the info command.
pub async fn run(args: &InfoArgs, cli: &Cli) -> Result<()> {
    let manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;

    let (preset, document) = manager.preset_info(&args.name).await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_preset_info(&preset, &document));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_preset(&preset)?);
        }
    }

    Ok(())
}
