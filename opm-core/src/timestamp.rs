//! Epoch timestamp and reset-countdown helpers.
//!
//! Credential files store expiry as epoch milliseconds while some quota
//! endpoints report epoch seconds; [`from_epoch_auto`] accepts either.
//! [`countdown`] renders the time until a reset the way the quota table
//! shows it.

use chrono::{DateTime, Utc};

/// Raw epoch values at or above this are interpreted as milliseconds.
/// (1e11 seconds is the year 5138; 1e11 milliseconds is March 1973.)
const EPOCH_MILLIS_THRESHOLD: f64 = 100_000_000_000.0;

/// Converts a raw epoch number into a timestamp, auto-detecting seconds
/// versus milliseconds. Non-finite and non-positive inputs yield `None`.
#[allow(clippy::cast_possible_truncation)]
pub fn from_epoch_auto(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }
    let millis = if raw >= EPOCH_MILLIS_THRESHOLD {
        raw
    } else {
        raw * 1000.0
    };
    DateTime::from_timestamp_millis(millis as i64)
}

/// Formats the remaining time until `resets_at` as a human countdown.
///
/// `"-"` when no reset time is known, `"due now"` once the reset has
/// passed, otherwise `"{h}h {m}m"` or `"{m}m"`; positive sub-minute
/// remainders round up to `"1m"`.
pub fn countdown(resets_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(resets_at) = resets_at else {
        return "-".to_string();
    };

    let secs = (resets_at - now).num_seconds();
    if secs <= 0 {
        return "due now".to_string();
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        "1m".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
