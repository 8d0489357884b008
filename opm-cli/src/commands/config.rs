//! Config command - inspect or change the opm configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use opm_store::{PresetManager, StorePaths};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration and store paths.
    Show,

    /// Point opm at a different credential file.
    SetAuthPath {
        /// Path of the credential file to manage.
        path: PathBuf,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::SetAuthPath { path } => set_auth_path(path.clone(), cli).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;
    let paths = manager.paths();
    let config = manager.config();

    match cli.format {
        OutputFormat::Text => {
            println!("opm Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Auth file:        {}", config.auth_path.display());
            println!("Config dir:       {}", paths.config_dir().display());
            println!("Presets dir:      {}", paths.presets_dir().display());
            println!("Backups dir:      {}", paths.backups_dir().display());
            println!(
                "Current preset:   {}",
                config.current_preset.as_deref().unwrap_or("none")
            );
            println!(
                "Backup retention: {}",
                config
                    .backup_retention
                    .map_or_else(|| "keep all".to_string(), |n| n.to_string())
            );
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "authPath": config.auth_path.display().to_string(),
                "configDir": paths.config_dir().display().to_string(),
                "presetsDir": paths.presets_dir().display().to_string(),
                "backupsDir": paths.backups_dir().display().to_string(),
                "currentPreset": config.current_preset,
                "backupRetention": config.backup_retention,
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

async fn set_auth_path(path: PathBuf, cli: &Cli) -> Result<()> {
    let mut manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;

    manager.set_auth_path(path.clone()).await?;

    match cli.format {
        OutputFormat::Text => {
            println!("Auth path set to: {}", path.display());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = serde_json::json!({ "authPath": path.display().to_string() });
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}
