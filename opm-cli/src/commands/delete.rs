//! Delete command - remove a stored preset.

use anyhow::Result;
use clap::Args;

use opm_store::{PresetManager, StorePaths};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Preset to delete.
    pub name: String,
}

/// Runs the delete command.
///
/// Deletes the preset file and its metadata. Backups are never touched.
pub async fn run(args: &DeleteArgs, cli: &Cli) -> Result<()> {
    let mut manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;

    manager.delete_preset(&args.name).await?;

    match cli.format {
        OutputFormat::Text => {
            println!("Deleted preset '{}'", args.name);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = serde_json::json!({ "deleted": args.name });
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}
