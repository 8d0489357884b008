//! Quota command - aggregate OAuth quota across every stored credential.

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, warn};

use opm_providers::antigravity;
use opm_quota::{QuotaEngine, QuotaSources};
use opm_store::{PresetManager, StorePaths};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the quota command.
///
/// Per-token fetch failures are rows in the report, not command failures:
/// as long as the sources could be scanned, the exit status stays zero.
pub async fn run(cli: &Cli) -> Result<()> {
    let manager =
        PresetManager::open(StorePaths::discover(cli.config_dir.clone())).await?;

    // An unparseable active file still leaves presets and external accounts
    // worth reporting on.
    let active = match manager.read_active().await {
        Ok(document) => document,
        Err(err) if err.is_corrupt() => {
            warn!(error = %err, "Skipping unreadable active file");
            None
        }
        Err(err) => return Err(err.into()),
    };

    let sources = QuotaSources {
        active,
        presets: manager.preset_documents().await?,
        external: antigravity::load_external_accounts(),
    };
    debug!(
        presets = sources.presets.len(),
        external = sources.external.len(),
        "Quota sources scanned"
    );

    let now = Utc::now();
    let report = QuotaEngine::new().run(&sources, now).await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_quota_report(&report, now));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_quota_report(&report)?);
        }
    }

    Ok(())
}
