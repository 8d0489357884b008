//! The snapshot store: one JSON file per preset.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use opm_core::AuthDocument;

use crate::error::StoreError;
use crate::persistence;

// ============================================================================
// Name Validation
// ============================================================================

/// Validates that a preset name is non-empty and filesystem-safe.
///
/// Names become file stems, so anything that could escape the presets
/// directory or collide with hidden/temp files is rejected.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let reject = |reason: &'static str| -> Result<(), StoreError> {
        Err(StoreError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("name is empty");
    }
    if name == "." || name == ".." {
        return reject("name is a directory reference");
    }
    if name.starts_with('.') {
        return reject("name starts with a dot");
    }
    if name.contains('/') || name.contains('\\') {
        return reject("name contains a path separator");
    }
    if name
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ')))
    {
        return reject("name contains characters outside [A-Za-z0-9._ -]");
    }
    Ok(())
}

// ============================================================================
// Preset Store
// ============================================================================

/// Durable mapping from preset name to credential payload.
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    /// Creates a store over the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this store enumerates.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `name`. The name must already be validated.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Returns true if a preset file for `name` exists.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }

    /// Writes `payload` as the preset `name`, atomically, overwriting any
    /// existing preset of the same name.
    pub async fn save(&self, name: &str, payload: &AuthDocument) -> Result<(), StoreError> {
        validate_name(name)?;
        persistence::ensure_dir(&self.dir).await?;
        persistence::save_json(&self.path_for(name), payload).await?;
        debug!(preset = name, "Preset payload written");
        Ok(())
    }

    /// Loads the payload stored under `name`.
    pub async fn load(&self, name: &str) -> Result<AuthDocument, StoreError> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }

        let content = tokio::fs::read_to_string(&path).await?;
        AuthDocument::parse(&content).map_err(|source| StoreError::CorruptPreset {
            name: name.to_string(),
            source,
        })
    }

    /// Enumerates stored preset names, sorted.
    pub async fn names(&self) -> Result<Vec<String>, StoreError> {
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
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Removes the preset `name`.
    pub async fn delete(&self, name: &str) -> Result<(), StoreError> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }

        tokio::fs::remove_file(&path).await?;
        debug!(preset = name, "Preset deleted");
        Ok(())
    }

    /// Returns the name of the first preset (in name order) whose payload is
    /// structurally identical to `active`, or `None`.
    ///
    /// Unparseable preset files are skipped here; corruption is surfaced
    /// when that preset is actually loaded or switched to.
    pub async fn detect_current(
        &self,
        active: &AuthDocument,
    ) -> Result<Option<String>, StoreError> {
        for name in self.names().await? {
            match self.load(&name).await {
                Ok(payload) if payload == *active => return Ok(Some(name)),
                Ok(_) => {}
                Err(err) => {
                    warn!(preset = %name, error = %err, "Skipping unreadable preset during detection");
                }
            }
        }
        Ok(None)
    }

    /// Reads the service list of `name`, tolerating unreadable files.
    pub async fn service_list(&self, name: &str) -> Vec<String> {
        match self.load(name).await {
            Ok(payload) => payload.services().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> AuthDocument {
        let mut doc = AuthDocument::new();
        doc.insert("openai", json!({"type": "oauth", "access": "tok"}));
        doc.insert("anthropic", json!({"type": "oauth", "refresh": "r"}));
        doc
    }

    #[test]
    fn test_validate_name_accepts_normal_names() {
        for name in ["work", "personal-2", "team_a", "Backup 1", "v1.2"] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_validate_name_rejects_unsafe_names() {
        for name in ["", ".", "..", ".hidden", "a/b", "a\\b", "x\0y", "tab\tname"] {
            assert!(
                matches!(validate_name(name), Err(StoreError::InvalidName { .. })),
                "{name:?} should be invalid"
            );
        }
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        let doc = sample_doc();

        store.save("work", &doc).await.unwrap();
        let loaded = store.load("work").await.unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());

        store.save("work", &sample_doc()).await.unwrap();
        let mut changed = sample_doc();
        changed.insert("google", json!({"type": "oauth", "refresh": "g"}));
        store.save("work", &changed).await.unwrap();

        assert_eq!(store.load("work").await.unwrap(), changed);
        assert_eq!(store.names().await.unwrap(), vec!["work"]);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());

        let err = store.load("ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { name } if name == "ghost"));
    }

    #[tokio::test]
    async fn test_load_corrupt_preset() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        tokio::fs::write(store.path_for("bad"), "{ nope").await.unwrap();

        let err = store.load("bad").await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptPreset { name, .. } if name == "bad"));
    }

    #[tokio::test]
    async fn test_names_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());

        store.save("zeta", &sample_doc()).await.unwrap();
        store.save("alpha", &sample_doc()).await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignore me").await.unwrap();

        assert_eq!(store.names().await.unwrap(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_names_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path().join("never-created"));
        assert!(store.names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());

        store.save("work", &sample_doc()).await.unwrap();
        store.delete("work").await.unwrap();
        assert!(!store.exists("work"));

        let err = store.delete("work").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_detect_current_matches_structurally() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());

        store.save("work", &sample_doc()).await.unwrap();
        let mut other = sample_doc();
        other.insert("google", json!({"refresh": "g"}));
        store.save("other", &other).await.unwrap();

        assert_eq!(
            store.detect_current(&sample_doc()).await.unwrap().as_deref(),
            Some("work")
        );

        let mut drifted = sample_doc();
        drifted.insert("openai", json!({"type": "oauth", "access": "rotated"}));
        assert!(store.detect_current(&drifted).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_detect_current_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());

        tokio::fs::write(store.path_for("broken"), "][").await.unwrap();
        store.save("work", &sample_doc()).await.unwrap();

        assert_eq!(
            store.detect_current(&sample_doc()).await.unwrap().as_deref(),
            Some("work")
        );
    }
}
