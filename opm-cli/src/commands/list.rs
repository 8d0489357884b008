//! List command - show stored presets.

use anyhow::Result;

use opm_store::{PresetManager, StorePaths};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the list command.
pub async fn run(cli: &Cli) -> Result<()> {
    let manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;
    let presets = manager.list_presets().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_preset_list(&presets));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_presets(&presets)?);
        }
    }

    Ok(())
}
