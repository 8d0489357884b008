//! Provider and token types.
//!
//! This module contains the types the quota engine works with:
//! - [`ProviderKind`] - Tagged union of supported quota providers
//! - [`TokenRecord`] - One OAuth credential extracted from a document
//! - [`Origin`] - Where a token was discovered (preset, active file, ...)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Provider Kind
// ============================================================================

/// Supported quota provider kinds.
///
/// Each variant owns its token extraction and quota-response decoding;
/// adding a provider means adding a variant plus its decode routine, not
/// touching dispatch logic elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// OpenAI (Codex / ChatGPT backend usage API).
    Openai,
    /// Google Antigravity (Cloud Code quota API).
    GoogleAntigravity,
}

impl ProviderKind {
    /// Returns the display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Openai => "OpenAI",
            Self::GoogleAntigravity => "Antigravity",
        }
    }

    /// Returns the CLI/config name for this provider (kebab-case).
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::GoogleAntigravity => "google-antigravity",
        }
    }

    /// Returns all supported provider kinds.
    pub fn all() -> &'static [ProviderKind] {
        &[Self::Openai, Self::GoogleAntigravity]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cli_name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::Openai),
            "google-antigravity" => Ok(Self::GoogleAntigravity),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

// ============================================================================
// Token Record
// ============================================================================

/// One OAuth credential extracted from a credential document.
///
/// Identity for deduplication: two records are the same account when the
/// provider matches and either the access-token values or the refresh-token
/// values match (access tokens rotate under a stable refresh token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Which provider this token authenticates against.
    pub provider: ProviderKind,
    /// Bearer access token, if present.
    pub access: Option<String>,
    /// Refresh token, if present.
    pub refresh: Option<String>,
    /// Access-token expiry, if the document carried one.
    pub expires_at: Option<DateTime<Utc>>,
    /// Provider-side account or project identifier, if known.
    pub account: Option<String>,
}

impl TokenRecord {
    /// Creates a record with only the provider set.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            access: None,
            refresh: None,
            expires_at: None,
            account: None,
        }
    }

    /// Sets the access token.
    pub fn with_access(mut self, access: impl Into<String>) -> Self {
        self.access = Some(access.into());
        self
    }

    /// Sets the refresh token.
    pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
        self.refresh = Some(refresh.into());
        self
    }

    /// Sets the expiry.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the account/project identifier.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// True if the known expiry has passed. Unknown expiry counts as valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }

    /// True if there is an access token that is not known to be expired.
    pub fn has_usable_access(&self, now: DateTime<Utc>) -> bool {
        self.access.as_deref().is_some_and(|a| !a.is_empty()) && !self.is_expired(now)
    }

    /// True if the record carries at least one credential value.
    pub fn has_any_credential(&self) -> bool {
        self.access.as_deref().is_some_and(|a| !a.is_empty())
            || self.refresh.as_deref().is_some_and(|r| !r.is_empty())
    }
}

// ============================================================================
// Origin
// ============================================================================

/// Where a token was discovered.
///
/// Variant order doubles as presentation order: the active file first, then
/// external accounts, then presets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The active credential file itself.
    ActiveFile,
    /// An entry of the external Antigravity accounts file, by email.
    External(String),
    /// A stored preset, by name.
    Preset(String),
}

impl Origin {
    /// Human-readable label used in quota tables.
    pub fn label(&self) -> String {
        match self {
            Self::ActiveFile => "(Current Active)".to_string(),
            Self::External(email) => format!("(Antigravity: {email})"),
            Self::Preset(name) => name.clone(),
        }
    }

    /// True for the active-file origin.
    pub fn is_active_file(&self) -> bool {
        matches!(self, Self::ActiveFile)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Tests
// ============================================================================
