//! The preset manager: one façade over config, presets, and backups.
//!
//! Every CLI command talks to [`PresetManager`]. It owns the loaded config
//! and wires the snapshot store, the backup store, and the switch pipeline
//! together. Construction is explicit: callers resolve a [`StorePaths`]
//! (honoring any override) and hand it in; nothing here reads global state.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use opm_core::{AuthDocument, Preset, PresetMeta};

use crate::backups::BackupStore;
use crate::config::{Config, StorePaths};
use crate::error::StoreError;
use crate::persistence;
use crate::presets::{PresetStore, validate_name};
use crate::switch::{SwitchError, SwitchPhase, SwitchReport};

// ============================================================================
// Preset Manager
// ============================================================================

/// Orchestrates preset storage, backups, and switching for one store.
#[derive(Debug)]
pub struct PresetManager {
    paths: StorePaths,
    config: Config,
    presets: PresetStore,
    backups: BackupStore,
}

impl PresetManager {
    /// Opens (or initializes) the store at `paths`.
    ///
    /// Creates the directory layout on first run and loads the config; a
    /// present but unparseable config is an error, never replaced.
    pub async fn open(paths: StorePaths) -> Result<Self, StoreError> {
        persistence::ensure_dir(paths.config_dir()).await?;
        persistence::ensure_dir(&paths.presets_dir()).await?;
        persistence::ensure_dir(&paths.backups_dir()).await?;

        let config = Config::load(&paths.config_file()).await?;
        let presets = PresetStore::new(paths.presets_dir());
        let backups = BackupStore::new(paths.backups_dir());

        Ok(Self {
            paths,
            config,
            presets,
            backups,
        })
    }

    /// The resolved store layout.
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the managed credential file.
    pub fn auth_path(&self) -> &Path {
        &self.config.auth_path
    }

    /// The backup store (pre-switch snapshots).
    pub fn backup_store(&self) -> &BackupStore {
        &self.backups
    }

    /// Points the manager at a different credential file and persists the
    /// change.
    pub async fn set_auth_path(&mut self, path: PathBuf) -> Result<(), StoreError> {
        info!(path = %path.display(), "Updating auth path");
        self.config.auth_path = path;
        self.config.save(&self.paths.config_file()).await
    }

    // ========================================================================
    // Active file
    // ========================================================================

    /// Reads the active credential file.
    ///
    /// `None` when the file does not exist; `CorruptActive` when it exists
    /// but fails to parse.
    pub async fn read_active(&self) -> Result<Option<AuthDocument>, StoreError> {
        let path = &self.config.auth_path;
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                AuthDocument::parse(&content)
                    .map(Some)
                    .map_err(|source| StoreError::CorruptActive {
                        path: path.clone(),
                        source,
                    })
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the name of the preset the active file currently matches,
    /// if any. A missing active file matches nothing.
    pub async fn detect_current(&self) -> Result<Option<String>, StoreError> {
        match self.read_active().await? {
            None => Ok(None),
            Some(active) => self.presets.detect_current(&active).await,
        }
    }

    // ========================================================================
    // Preset operations
    // ========================================================================

    /// Snapshots the active credential file as preset `name`.
    ///
    /// The payload must parse before anything is written; an unparseable
    /// active file is rejected and nothing is stored. Overwrites an existing
    /// preset of the same name and marks it current.
    #[instrument(skip(self, description, watched_services))]
    pub async fn save_preset(
        &mut self,
        name: &str,
        description: &str,
        watched_services: Option<Vec<String>>,
    ) -> Result<Preset, StoreError> {
        validate_name(name)?;

        let payload = self.read_active().await?.ok_or_else(|| StoreError::MissingAuthFile {
            path: self.config.auth_path.clone(),
        })?;

        self.presets.save(name, &payload).await?;

        let services: Vec<String> = payload.services().map(str::to_string).collect();
        let meta = PresetMeta::stamped(Utc::now(), description, services, watched_services);
        self.config.set_preset_meta(name, meta.clone());
        self.config.current_preset = Some(name.to_string());
        self.config.save(&self.paths.config_file()).await?;

        info!(preset = name, services = meta.services.len(), "Preset saved");
        Ok(Preset::new(name, meta, true))
    }

    /// Lists stored presets in name order, with metadata joined from the
    /// config and service lists re-read from the preset files.
    pub async fn list_presets(&self) -> Result<Vec<Preset>, StoreError> {
        let mut result = Vec::new();
        for name in self.presets.names().await? {
            let mut meta = self.config.preset_meta(&name).cloned().unwrap_or_default();
            meta.services = self.presets.service_list(&name).await;
            let is_current = self.config.current_preset.as_deref() == Some(name.as_str());
            result.push(Preset::new(name, meta, is_current));
        }
        Ok(result)
    }

    /// Returns metadata and payload for one preset.
    pub async fn preset_info(&self, name: &str) -> Result<(Preset, AuthDocument), StoreError> {
        let payload = self.presets.load(name).await?;
        let mut meta = self.config.preset_meta(name).cloned().unwrap_or_default();
        meta.services = payload.services().map(str::to_string).collect();
        let is_current = self.config.current_preset.as_deref() == Some(name);
        Ok((Preset::new(name, meta, is_current), payload))
    }

    /// Deletes preset `name` and its metadata. Clears the current-preset
    /// marker if it pointed at the deleted preset.
    #[instrument(skip(self))]
    pub async fn delete_preset(&mut self, name: &str) -> Result<(), StoreError> {
        self.presets.delete(name).await?;
        self.config.remove_preset(name);
        self.config.save(&self.paths.config_file()).await?;
        info!(preset = name, "Preset deleted");
        Ok(())
    }

    /// Loads every parseable preset payload, for quota collection.
    /// Unreadable presets are skipped with a warning.
    pub async fn preset_documents(&self) -> Result<Vec<(String, AuthDocument)>, StoreError> {
        let mut docs = Vec::new();
        for name in self.presets.names().await? {
            match self.presets.load(&name).await {
                Ok(doc) => docs.push((name, doc)),
                Err(err) => {
                    warn!(preset = %name, error = %err, "Skipping unreadable preset for quota collection");
                }
            }
        }
        Ok(docs)
    }

    // ========================================================================
    // Switching
    // ========================================================================

    /// Switches the active credential file to preset `name`.
    pub async fn switch(
        &mut self,
        name: &str,
        auto_backup: bool,
    ) -> Result<SwitchReport, SwitchError> {
        self.run_switch(name, None, auto_backup).await
    }

    /// Switches only `services` over from preset `name`, preserving every
    /// other service currently in the active file.
    pub async fn switch_selective(
        &mut self,
        name: &str,
        services: &[String],
        auto_backup: bool,
    ) -> Result<SwitchReport, SwitchError> {
        self.run_switch(name, Some(services), auto_backup).await
    }

    #[instrument(skip(self, selected), fields(selective = selected.is_some()))]
    async fn run_switch(
        &mut self,
        name: &str,
        selected: Option<&[String]>,
        auto_backup: bool,
    ) -> Result<SwitchReport, SwitchError> {
        let fail = |phase: SwitchPhase| {
            let preset = name;
            move |source: StoreError| SwitchError::new(preset, phase, source)
        };

        // Diffing: load the target, read the current state, build the payload
        // that will land in the active file.
        let target = self.presets.load(name).await.map_err(fail(SwitchPhase::Diffing))?;
        let current = self
            .read_active()
            .await
            .map_err(fail(SwitchPhase::Diffing))?
            .unwrap_or_default();

        let (payload, selected_list) = match selected {
            None => (target, None),
            Some(services) => {
                let missing: Vec<String> = services
                    .iter()
                    .filter(|s| !target.contains(s))
                    .cloned()
                    .collect();
                if services.is_empty() || !missing.is_empty() {
                    return Err(fail(SwitchPhase::Diffing)(StoreError::InvalidSelection {
                        preset: name.to_string(),
                        services: missing,
                    }));
                }

                let mut merged = current.clone();
                for service in services {
                    if let Some(record) = target.get(service) {
                        merged.insert(service.clone(), record.clone());
                    }
                }
                (merged, Some(services.to_vec()))
            }
        };

        let diff = current.diff(&payload);
        tracing::debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            modified = diff.modified.len(),
            "Computed switch diff"
        );

        // BackingUp: the backup must be durable before the active file is
        // touched. Skipped when there is nothing to back up.
        let mut backup = None;
        if auto_backup && self.config.auth_path.exists() {
            let id = self
                .backups
                .create(name, &current, Utc::now())
                .await
                .map_err(fail(SwitchPhase::BackingUp))?;
            backup = Some(id);

            if let Some(keep) = self.config.backup_retention {
                // Retention is housekeeping; a prune failure never fails the
                // switch.
                if let Err(err) = self.backups.prune(keep).await {
                    warn!(error = %err, "Backup pruning failed");
                }
            }
        }

        // Replacing: atomic temp-write + rename.
        persistence::save_json(&self.config.auth_path, &payload)
            .await
            .map_err(|e| fail(SwitchPhase::Replacing)(e).with_backup(backup.clone()))?;

        // Verifying: read back and compare.
        let written = self
            .read_active()
            .await
            .map_err(|e| fail(SwitchPhase::Verifying)(e).with_backup(backup.clone()))?;
        if written.as_ref() != Some(&payload) {
            return Err(fail(SwitchPhase::Verifying)(StoreError::VerificationFailed {
                path: self.config.auth_path.clone(),
            })
            .with_backup(backup));
        }

        // Finalizing: record the new current preset.
        self.config.current_preset = Some(name.to_string());
        if let Some(meta) = self.config.presets.get_mut(name) {
            meta.last_used = Some(Utc::now());
        }
        self.config
            .save(&self.paths.config_file())
            .await
            .map_err(|e| fail(SwitchPhase::Finalizing)(e).with_backup(backup.clone()))?;

        info!(
            preset = name,
            changes = diff.change_count(),
            backup = backup.as_deref().unwrap_or("none"),
            "Switch complete"
        );

        Ok(SwitchReport {
            preset: name.to_string(),
            diff,
            backup,
            source: self.presets.path_for(name),
            destination: self.config.auth_path.clone(),
            selected: selected_list,
        })
    }
}
