//! Configuration management.
//!
//! Two pieces: [`StorePaths`], the resolved filesystem layout every component
//! is handed explicitly (no process-wide globals), and [`Config`], the single
//! persisted record of the active-file path, the last-selected preset, and
//! per-preset metadata.
//!
//! Config file shape:
//!
//! ```json
//! {
//!   "auth_path": "/home/me/.local/share/opencode/auth.json",
//!   "current_preset": "work",
//!   "presets": {
//!     "work": {
//!       "description": "work account",
//!       "services": ["anthropic", "openai"],
//!       "watched_services": ["openai"],
//!       "created_at": "2025-06-01T09:30:00Z",
//!       "last_used": "2025-06-03T17:12:41Z"
//!     }
//!   },
//!   "backup_retention": null
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use opm_core::PresetMeta;

use crate::error::StoreError;
use crate::persistence::{self, default_auth_path, default_config_dir};

// ============================================================================
// Store Paths
// ============================================================================

/// Resolved filesystem layout of one opm store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    config_dir: PathBuf,
}

impl StorePaths {
    /// Creates the layout rooted at an explicit config directory.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Resolves the layout, honoring an override (e.g. a `--config-dir`
    /// flag) and falling back to the platform default.
    pub fn discover(override_dir: Option<PathBuf>) -> Self {
        Self::new(override_dir.unwrap_or_else(default_config_dir))
    }

    /// The root config directory.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the config document.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Directory holding one JSON file per preset.
    pub fn presets_dir(&self) -> PathBuf {
        self.config_dir.join("presets")
    }

    /// Directory holding pre-switch backups.
    pub fn backups_dir(&self) -> PathBuf {
        self.config_dir.join("backups")
    }
}

// ============================================================================
// Config
// ============================================================================

/// The persisted opm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the managed credential file.
    pub auth_path: PathBuf,
    /// Name of the last-selected preset, if any.
    #[serde(default)]
    pub current_preset: Option<String>,
    /// Per-preset metadata, keyed by preset name.
    #[serde(default)]
    pub presets: BTreeMap<String, PresetMeta>,
    /// How many backups to keep after each switch. Absent means keep all.
    #[serde(default)]
    pub backup_retention: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_path: default_auth_path(),
            current_preset: None,
            presets: BTreeMap::new(),
            backup_retention: None,
        }
    }
}

impl Config {
    /// Loads the config from `path`.
    ///
    /// A missing file yields the default config (first run); a present but
    /// unparseable file is `CorruptConfig` -- never silently replaced.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|source| StoreError::CorruptConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persists the config to `path` atomically.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        persistence::save_json(path, self).await
    }

    /// Returns the metadata for `name`, if any was recorded.
    pub fn preset_meta(&self, name: &str) -> Option<&PresetMeta> {
        self.presets.get(name)
    }

    /// Records metadata for `name`, replacing any previous entry.
    pub fn set_preset_meta(&mut self, name: impl Into<String>, meta: PresetMeta) {
        self.presets.insert(name.into(), meta);
    }

    /// Drops the metadata for `name` and clears `current_preset` if it
    /// pointed at the removed entry.
    pub fn remove_preset(&mut self, name: &str) {
        self.presets.remove(name);
        if self.current_preset.as_deref() == Some(name) {
            self.current_preset = None;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_store_paths_layout() {
        let paths = StorePaths::new("/tmp/opm-test");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/opm-test/config.json"));
        assert_eq!(paths.presets_dir(), PathBuf::from("/tmp/opm-test/presets"));
        assert_eq!(paths.backups_dir(), PathBuf::from("/tmp/opm-test/backups"));
    }

    #[test]
    fn test_discover_prefers_override() {
        let paths = StorePaths::discover(Some(PathBuf::from("/custom")));
        assert_eq!(paths.config_dir(), Path::new("/custom"));
    }

    #[tokio::test]
    async fn test_load_missing_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).await.unwrap();
        assert!(config.current_preset.is_none());
        assert!(config.presets.is_empty());
        assert!(config.backup_retention.is_none());
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config {
            auth_path: PathBuf::from("/tmp/auth.json"),
            ..Config::default()
        };
        config.current_preset = Some("work".to_string());
        config.set_preset_meta(
            "work",
            PresetMeta::stamped(Utc::now(), "desc", vec!["openai".into()], None),
        );
        config.backup_retention = Some(10);

        config.save(&path).await.unwrap();
        let loaded = Config::load(&path).await.unwrap();

        assert_eq!(loaded.auth_path, PathBuf::from("/tmp/auth.json"));
        assert_eq!(loaded.current_preset.as_deref(), Some("work"));
        assert_eq!(loaded.backup_retention, Some(10));
        assert_eq!(loaded.preset_meta("work").unwrap().description, "desc");
    }

    #[tokio::test]
    async fn test_corrupt_config_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "{ not valid json").await.unwrap();

        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptConfig { .. }));
    }

    #[tokio::test]
    async fn test_unknown_fields_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let json = r#"{
            "auth_path": "/tmp/auth.json",
            "current_preset": null,
            "presets": {},
            "future_field": {"nested": true}
        }"#;
        tokio::fs::write(&path, json).await.unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.auth_path, PathBuf::from("/tmp/auth.json"));
    }

    #[test]
    fn test_remove_preset_clears_current() {
        let mut config = Config::default();
        config.set_preset_meta("work", PresetMeta::default());
        config.current_preset = Some("work".to_string());

        config.remove_preset("work");
        assert!(config.current_preset.is_none());
        assert!(config.preset_meta("work").is_none());
    }
}
