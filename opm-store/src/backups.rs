//! Pre-switch backups of the active credential file.
//!
//! Backups are append-only: a new file per switch, never overwritten, and
//! never deleted because a later step failed. Pruning only happens when the
//! config opts into a retention count.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use opm_core::AuthDocument;

use crate::error::StoreError;
use crate::persistence;

// ============================================================================
// Backup Store
// ============================================================================

/// Timestamped copies of the active credential file.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    /// Creates a store over the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory backups are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the backup file `id` (as returned by [`BackupStore::create`]).
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(id)
    }

    /// Writes `payload` as a new backup tagged with `tag` (the preset being
    /// switched to) and `now`. Returns the backup's file name.
    ///
    /// The write is atomic and the file name is uniquified if two switches
    /// land in the same second, so an existing backup is never overwritten.
    pub async fn create(
        &self,
        tag: &str,
        payload: &AuthDocument,
        now: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        persistence::ensure_dir(&self.dir).await?;

        let stamp = now.format("%Y%m%d_%H%M%S");
        let base = format!("before_{tag}_{stamp}");
        let mut id = format!("{base}.json");
        let mut counter = 1u32;
        while self.dir.join(&id).exists() {
            id = format!("{base}-{counter}.json");
            counter += 1;
        }

        persistence::save_json(&self.dir.join(&id), payload).await?;
        info!(backup = %id, "Backup written");
        Ok(id)
    }

    /// Enumerates backup file names, sorted (timestamp order for a given
    /// naming scheme).
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Deletes the oldest backups beyond `keep`, returning how many were
    /// removed. With enough room this is a no-op.
    ///
    /// Age comes from file modification time, not the name: names lead with
    /// the preset tag, so name order is not time order across presets.
    pub async fn prune(&self, keep: usize) -> Result<usize, StoreError> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut backups: Vec<(std::time::SystemTime, String)> = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let modified = entry.metadata().await?.modified()?;
            backups.push((modified, name.to_string()));
        }

        if backups.len() <= keep {
            return Ok(0);
        }

        backups.sort();
        let excess = backups.len() - keep;
        for (_, name) in &backups[..excess] {
            debug!(backup = %name, "Pruning old backup");
            tokio::fs::remove_file(self.dir.join(name)).await?;
        }
        Ok(excess)
    }
}

// ============================================================================
// Tests
// ============================================================================
