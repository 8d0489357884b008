//! Normalized quota data.
//!
//! Provider responses are heterogeneous; everything the quota engine hands
//! onward is normalized into [`QuotaRecord`]s. Providers with rolling usage
//! windows fill `daily`/`weekly`; tiered providers emit one record per model
//! tier with a single `daily` window and a `tier` label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::token::ProviderKind;
use crate::timestamp;

// ============================================================================
// Quota Window
// ============================================================================

/// One usage window: how much remains and when it resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaWindow {
    /// Remaining budget, 0..=100.
    pub remaining_percent: u8,
    /// When the window resets, if the provider reported it.
    pub resets_at: Option<DateTime<Utc>>,
}

impl QuotaWindow {
    /// Creates a window from an already-clamped percentage.
    pub fn new(remaining_percent: u8, resets_at: Option<DateTime<Utc>>) -> Self {
        Self {
            remaining_percent: remaining_percent.min(100),
            resets_at,
        }
    }

    /// Normalizes a provider-reported "used percent" figure.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_used_percent(used: f64, resets_at: Option<DateTime<Utc>>) -> Self {
        let remaining = (100.0 - used).clamp(0.0, 100.0).round() as u8;
        Self::new(remaining, resets_at)
    }

    /// Normalizes a provider-reported "remaining fraction" figure (0.0..=1.0).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_remaining_fraction(fraction: f64, resets_at: Option<DateTime<Utc>>) -> Self {
        let remaining = (fraction * 100.0).clamp(0.0, 100.0) as u8;
        Self::new(remaining, resets_at)
    }

    /// Human countdown until this window resets.
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        timestamp::countdown(self.resets_at, now)
    }
}

// ============================================================================
// Quota Status
// ============================================================================

/// Outcome of one quota fetch.
///
/// Per-token outcomes are data, not errors: one token's failure never aborts
/// the batch, it is recorded here and displayed alongside the successes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuotaStatus {
    /// The fetch succeeded and the body decoded cleanly.
    Ok,
    /// The endpoint rejected the credential (HTTP 401/403).
    Unauthorized,
    /// The endpoint rate-limited the call (HTTP 429).
    RateLimited,
    /// The fetch failed: transport error, timeout, expired token, or a 2xx
    /// body that did not match the provider's shape.
    Failed {
        /// What went wrong, for display.
        detail: String,
    },
}

impl QuotaStatus {
    /// Convenience constructor for [`QuotaStatus::Failed`].
    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Failed {
            detail: detail.into(),
        }
    }

    /// True for [`QuotaStatus::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Short machine-style label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate-limited",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for QuotaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { detail } => write!(f, "failed: {detail}"),
            other => write!(f, "{}", other.label()),
        }
    }
}

// ============================================================================
// Quota Record
// ============================================================================

/// Normalized quota result for one token (or one tier of one token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    /// Provider the figures came from.
    pub provider: ProviderKind,
    /// Account/project identifier, when known.
    pub account: Option<String>,
    /// Model-tier label for tiered providers (e.g. "G3Pro").
    pub tier: Option<String>,
    /// Daily (or per-tier) window.
    pub daily: Option<QuotaWindow>,
    /// Weekly window, for providers that report one.
    pub weekly: Option<QuotaWindow>,
    /// Fetch outcome.
    pub status: QuotaStatus,
}

impl QuotaRecord {
    /// Creates a record with the given status and no figures.
    pub fn new(provider: ProviderKind, status: QuotaStatus) -> Self {
        Self {
            provider,
            account: None,
            tier: None,
            daily: None,
            weekly: None,
            status,
        }
    }

    /// Creates a successful record.
    pub fn ok(provider: ProviderKind) -> Self {
        Self::new(provider, QuotaStatus::Ok)
    }

    /// Sets the account identifier.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Sets the tier label.
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Sets the daily window.
    pub fn with_daily(mut self, window: QuotaWindow) -> Self {
        self.daily = Some(window);
        self
    }

    /// Sets the weekly window.
    pub fn with_weekly(mut self, window: QuotaWindow) -> Self {
        self.weekly = Some(window);
        self
    }

    /// True if the record carries any usable figures.
    pub fn has_figures(&self) -> bool {
        self.daily.is_some() || self.weekly.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
