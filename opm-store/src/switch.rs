//! Switch operation types.
//!
//! A switch runs through a fixed sequence of phases:
//!
//! ```text
//! Diffing -> BackingUp -> Replacing -> Verifying -> Finalizing
//! ```
//!
//! Failure in any phase is terminal and carries the phase it happened in,
//! plus the id of any backup already written. The backup-before-replace
//! ordering is strict: once `BackingUp` completes, a recovery point exists
//! no matter what the later phases do.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use opm_core::ServiceDiff;

use crate::error::StoreError;

// ============================================================================
// Switch Phase
// ============================================================================

/// Where in the pipeline a switch currently is (or failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPhase {
    /// Loading the target, reading the current payload, computing the diff.
    Diffing,
    /// Writing the pre-switch backup.
    BackingUp,
    /// Atomically replacing the active credential file.
    Replacing,
    /// Reading the active file back and comparing it to the target payload.
    Verifying,
    /// Recording the new current preset in the config.
    Finalizing,
}

impl SwitchPhase {
    /// Human-readable phase name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Diffing => "diffing",
            Self::BackingUp => "backing up",
            Self::Replacing => "replacing",
            Self::Verifying => "verifying",
            Self::Finalizing => "finalizing",
        }
    }
}

impl fmt::Display for SwitchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Switch Report
// ============================================================================

/// The result of a completed switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchReport {
    /// The preset switched to.
    pub preset: String,
    /// Service-level changes applied to the active file.
    pub diff: ServiceDiff,
    /// File name of the backup written before the replace, if one was.
    pub backup: Option<String>,
    /// Path of the preset file that supplied the payload.
    pub source: PathBuf,
    /// Path of the active credential file that was replaced.
    pub destination: PathBuf,
    /// Services actually applied for a selective switch; `None` for a full
    /// switch.
    pub selected: Option<Vec<String>>,
}

// ============================================================================
// Switch Error
// ============================================================================

/// A switch that failed, with the phase it failed in.
///
/// If `backup` is set, the pre-switch payload is already durable on disk and
/// stays there: a backup is never deleted because a later step failed.
#[derive(Debug, Error)]
#[error("switch to '{preset}' failed while {phase}: {source}")]
pub struct SwitchError {
    /// The target preset.
    pub preset: String,
    /// The phase the failure happened in.
    pub phase: SwitchPhase,
    /// Backup written before the failure, if the pipeline got that far.
    pub backup: Option<String>,
    /// The underlying store error.
    #[source]
    pub source: StoreError,
}

impl SwitchError {
    pub(crate) fn new(preset: &str, phase: SwitchPhase, source: StoreError) -> Self {
        Self {
            preset: preset.to_string(),
            phase,
            backup: None,
            source,
        }
    }

    pub(crate) fn with_backup(mut self, backup: Option<String>) -> Self {
        self.backup = backup;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
