//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the preset store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No preset with the given name exists.
    #[error("preset not found: {name}")]
    NotFound {
        /// The requested preset name.
        name: String,
    },

    /// A stored preset file failed to parse.
    #[error("preset '{name}' is corrupt: {source}")]
    CorruptPreset {
        /// The preset whose file failed to parse.
        name: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The config file failed to parse.
    #[error("config at {path} is corrupt: {source}")]
    CorruptConfig {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The active credential file failed to parse.
    #[error("active credential file at {path} is corrupt: {source}")]
    CorruptActive {
        /// Path of the active credential file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A preset name failed validation.
    #[error("invalid preset name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A selective switch referenced services absent from the target preset,
    /// or selected nothing at all.
    #[error("invalid service selection for preset '{preset}': {}", describe_selection(services))]
    InvalidSelection {
        /// The target preset.
        preset: String,
        /// The offending service names (empty means nothing was selected).
        services: Vec<String>,
    },

    /// The active credential file does not exist where it was expected.
    #[error("active credential file not found: {path}")]
    MissingAuthFile {
        /// The configured active-file path.
        path: PathBuf,
    },

    /// Post-switch verification found the active file differing from the
    /// payload that was just written.
    #[error("verification failed: {path} does not match the switched payload")]
    VerificationFailed {
        /// Path of the active credential file.
        path: PathBuf,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true for errors caused by a document failing to parse.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            StoreError::CorruptPreset { .. }
                | StoreError::CorruptConfig { .. }
                | StoreError::CorruptActive { .. }
        )
    }
}

fn describe_selection(services: &[String]) -> String {
    if services.is_empty() {
        "no services selected".to_string()
    } else {
        format!("not in target preset: {}", services.join(", "))
    }
}
