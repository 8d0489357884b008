//! Status command - the no-subcommand overview.

use anyhow::Result;

use opm_store::{PresetManager, StorePaths};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the status overview: active-file summary, the preset the active
/// file currently matches (or a drift note when only the last-selected
/// preset is known), and the preset table.
pub async fn run(cli: &Cli) -> Result<()> {
    let manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;

    let active = manager.read_active().await?;
    let detected = match &active {
        Some(_) => manager.detect_current().await?,
        None => None,
    };
    let selected = manager.config().current_preset.clone();
    let presets = manager.list_presets().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_status(
                    manager.auth_path(),
                    active.as_ref(),
                    detected.as_deref(),
                    selected.as_deref(),
                    &presets,
                )
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!(
                "{}",
                formatter.format_status(
                    manager.auth_path(),
                    active.as_ref(),
                    detected.as_deref(),
                    selected.as_deref(),
                    &presets,
                )?
            );
        }
    }

    Ok(())
}
