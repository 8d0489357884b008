//! Consolidated quota report.
//!
//! The report is the fan-out inverse of collection: each unique token was
//! fetched once, and its records are attributed back to every origin the
//! token appeared in. A preset sharing the active file's credential shows
//! the same figures twice, once per origin, without a second fetch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use opm_core::{Origin, QuotaRecord};

use crate::collect::UniqueToken;

/// One row of the report: a quota record attributed to one origin.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaEntry {
    /// Where the credential behind this record was found.
    pub origin: Origin,
    /// The fetched (or failure-status) record.
    pub record: QuotaRecord,
}

/// Consolidated quota across every origin.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaReport {
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Entries ordered active file first, then external accounts, then
    /// presets by name.
    pub entries: Vec<QuotaEntry>,
}

impl QuotaReport {
    /// Builds a report by fanning each token's records out to its origins.
    pub fn build(
        fetched: Vec<(UniqueToken, Vec<QuotaRecord>)>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut entries = Vec::new();
        for (token, records) in fetched {
            for origin in &token.origins {
                for record in &records {
                    entries.push(QuotaEntry {
                        origin: origin.clone(),
                        record: record.clone(),
                    });
                }
            }
        }
        // Stable sort: records for one origin keep their fetch order
        // (tier-sorted for Antigravity).
        entries.sort_by(|a, b| a.origin.cmp(&b.origin));

        Self {
            generated_at,
            entries,
        }
    }

    /// True when no credential produced an entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries belonging to the active credential file.
    pub fn active_entries(&self) -> impl Iterator<Item = &QuotaEntry> {
        self.entries.iter().filter(|e| e.origin.is_active_file())
    }

    /// Number of entries with a non-ok status.
    pub fn failure_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.record.status.is_ok())
            .count()
    }
}

// ============================================================================
// Tests
// ============================================================================
