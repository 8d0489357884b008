//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::Path;

use opm_core::{AuthDocument, Origin, Preset, QuotaRecord, QuotaStatus, QuotaWindow};
use opm_quota::QuotaReport;
use opm_store::SwitchReport;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one quota row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaEntryOutput {
    /// Origin label ("(Current Active)", preset name, ...).
    pub origin: String,
    /// Origin category: "active", "external", or "preset".
    pub origin_kind: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<WindowOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly: Option<WindowOutput>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A single usage window.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowOutput {
    pub remaining_percent: u8,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_datetime_opt"
    )]
    pub resets_at: Option<DateTime<Utc>>,
}

/// The full quota report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaReportOutput {
    #[serde(serialize_with = "serialize_datetime")]
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<QuotaEntryOutput>,
    pub failures: usize,
}

/// One preset in listings and detail views.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetOutput {
    pub name: String,
    pub description: String,
    pub services: Vec<String>,
    pub watched_services: Vec<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_datetime_opt"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_datetime_opt"
    )]
    pub last_used: Option<DateTime<Utc>>,
    pub current: bool,
}

/// The result of a completed switch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchOutput {
    pub preset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    pub unchanged: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Vec<String>>,
    pub destination: String,
}

/// The no-subcommand status overview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    pub auth_path: String,
    pub auth_file_present: bool,
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_selected: Option<String>,
    pub presets: Vec<PresetOutput>,
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the consolidated quota report.
    pub fn format_quota_report(&self, report: &QuotaReport) -> Result<String> {
        let entries: Vec<QuotaEntryOutput> = report
            .entries
            .iter()
            .map(|entry| self.entry_to_output(&entry.origin, &entry.record))
            .collect();

        self.format(&QuotaReportOutput {
            generated_at: report.generated_at,
            entries,
            failures: report.failure_count(),
        })
    }

    fn entry_to_output(&self, origin: &Origin, record: &QuotaRecord) -> QuotaEntryOutput {
        let (status, error) = match &record.status {
            QuotaStatus::Failed { detail } => ("failed".to_string(), Some(detail.clone())),
            other => (other.label().to_string(), None),
        };

        QuotaEntryOutput {
            origin: origin.label(),
            origin_kind: origin_kind(origin).to_string(),
            provider: record.provider.cli_name().to_string(),
            account: record.account.clone(),
            tier: record.tier.clone(),
            daily: record.daily.map(|w| self.window_to_output(&w)),
            weekly: record.weekly.map(|w| self.window_to_output(&w)),
            status,
            error,
        }
    }

    fn window_to_output(&self, window: &QuotaWindow) -> WindowOutput {
        WindowOutput {
            remaining_percent: window.remaining_percent,
            resets_at: window.resets_at,
        }
    }

    /// Formats a preset listing.
    pub fn format_presets(&self, presets: &[Preset]) -> Result<String> {
        let outputs: Vec<PresetOutput> = presets.iter().map(preset_to_output).collect();
        self.format(&outputs)
    }

    /// Formats a single preset detail view.
    pub fn format_preset(&self, preset: &Preset) -> Result<String> {
        self.format(&preset_to_output(preset))
    }

    /// Formats a switch result.
    pub fn format_switch_report(&self, report: &SwitchReport) -> Result<String> {
        self.format(&SwitchOutput {
            preset: report.preset.clone(),
            backup: report.backup.clone(),
            added: report.diff.added.clone(),
            removed: report.diff.removed.clone(),
            modified: report.diff.modified.clone(),
            unchanged: report.diff.unchanged.clone(),
            selected: report.selected.clone(),
            destination: report.destination.display().to_string(),
        })
    }

    /// Formats the status overview.
    pub fn format_status(
        &self,
        auth_path: &Path,
        active: Option<&AuthDocument>,
        detected: Option<&str>,
        selected: Option<&str>,
        presets: &[Preset],
    ) -> Result<String> {
        self.format(&StatusOutput {
            auth_path: auth_path.display().to_string(),
            auth_file_present: active.is_some(),
            services: active
                .map(|d| d.services().map(str::to_string).collect())
                .unwrap_or_default(),
            detected_preset: detected.map(str::to_string),
            last_selected: selected.map(str::to_string),
            presets: presets.iter().map(preset_to_output).collect(),
        })
    }
}

fn preset_to_output(preset: &Preset) -> PresetOutput {
    PresetOutput {
        name: preset.name.clone(),
        description: preset.meta.description.clone(),
        services: preset.meta.services.clone(),
        watched_services: preset.meta.watched_services.clone(),
        created_at: preset.meta.created_at,
        last_used: preset.meta.last_used,
        current: preset.is_current,
    }
}

fn origin_kind(origin: &Origin) -> &'static str {
    match origin {
        Origin::ActiveFile => "active",
        Origin::External(_) => "external",
        Origin::Preset(_) => "preset",
    }
}
