//! Antigravity quota API client.
//!
//! # API Endpoint
//!
//! ```text
//! POST https://cloudcode-pa.googleapis.com/v1internal:fetchAvailableModels
//! Authorization: Bearer <access_token>
//! User-Agent: antigravity/1.11.9
//!
//! {"project": "<project_id>"}
//! ```
//!
//! # Response Format
//!
//! ```json
//! {
//!   "models": {
//!     "gemini-3-pro-high": {
//!       "displayName": "Gemini 3 Pro",
//!       "quotaInfo": {
//!         "remainingFraction": 0.82,
//!         "resetTime": "2026-01-01T00:00:00Z"
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Duplicate model keys share a tier (`gemini-3-pro-high` and
//! `gemini-3-pro-low` are both "G3Pro"), so one fetch yields one record per
//! reported model rather than per tier. The endpoint expects the
//! Antigravity user agent and rejects unknown project ids less gracefully
//! than it handles the literal `"unknown-project"`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use opm_core::{ProviderKind, QuotaRecord, QuotaWindow, TokenRecord};

use super::error::AntigravityError;
use super::oauth::{TokenRefresher, TOKEN_URL};

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the Cloud Code API.
pub const API_BASE_URL: &str = "https://cloudcode-pa.googleapis.com";

/// Model quota endpoint path.
pub const MODELS_ENDPOINT: &str = "/v1internal:fetchAvailableModels";

/// User agent the quota endpoint expects.
pub const USER_AGENT: &str = "antigravity/1.11.9";

/// Project id sent when none is known.
pub const UNKNOWN_PROJECT: &str = "unknown-project";

/// Per-request timeout.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Error-body prefix length kept in failure details.
const BODY_SNIPPET_LEN: usize = 100;

// ============================================================================
// API Response Structures
// ============================================================================

/// Top-level response of the models endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    /// Available models keyed by model id.
    #[serde(default)]
    pub models: BTreeMap<String, ModelEntry>,
}

/// One model in the response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    /// Human-readable model name.
    pub display_name: Option<String>,
    /// Quota figures; models without them are informational only.
    pub quota_info: Option<QuotaInfo>,
}

/// Quota figures for one model.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaInfo {
    /// Remaining budget as a fraction (0.0..=1.0).
    pub remaining_fraction: Option<f64>,
    /// Reset time, RFC 3339 or epoch seconds as a string.
    pub reset_time: Option<String>,
}

// ============================================================================
// API Client
// ============================================================================

/// Client for the Cloud Code model quota endpoint.
#[derive(Debug, Clone)]
pub struct AntigravityQuotaClient {
    base_url: String,
    http: reqwest::Client,
    refresher: TokenRefresher,
}

impl Default for AntigravityQuotaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AntigravityQuotaClient {
    /// Creates a client against the production endpoints.
    pub fn new() -> Self {
        Self::with_urls(API_BASE_URL, TOKEN_URL)
    }

    /// Creates a client against custom endpoints (primarily for testing).
    pub fn with_urls(base_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        let refresher = TokenRefresher::with_token_url(http.clone(), token_url);
        Self {
            base_url: base_url.into(),
            http,
            refresher,
        }
    }

    /// Fetches per-model quota for `token`, one record per reported model.
    ///
    /// The stored access token is used while it looks usable; otherwise the
    /// refresh token is exchanged first. A 401 on a stored token triggers
    /// one refresh-and-retry before the rejection is reported.
    ///
    /// # Errors
    /// Returns [`AntigravityError`] when no credential is usable, the
    /// refresh exchange fails, the endpoint rejects or throttles the call,
    /// or the body decodes to no quota figures at all.
    #[instrument(skip(self, token), fields(project = token.account.as_deref()))]
    pub async fn fetch_quota(
        &self,
        token: &TokenRecord,
        now: DateTime<Utc>,
    ) -> Result<Vec<QuotaRecord>, AntigravityError> {
        let project = token.account.clone();

        let (access, already_refreshed) = match token
            .access
            .as_deref()
            .filter(|_| token.has_usable_access(now))
        {
            Some(access) => (access.to_string(), false),
            None => {
                let refresh = token
                    .refresh
                    .as_deref()
                    .filter(|refresh| !refresh.is_empty())
                    .ok_or(AntigravityError::NoCredentials)?;
                (self.refresher.refresh(refresh).await?, true)
            }
        };

        let mut response = self.request_models(&access, project.as_deref()).await?;

        // One refresh-and-retry when a stored access token is rejected.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED && !already_refreshed {
            if let Some(refresh) = token.refresh.as_deref().filter(|refresh| !refresh.is_empty()) {
                debug!("Stored access token rejected, refreshing and retrying");
                let fresh = self.refresher.refresh(refresh).await?;
                response = self.request_models(&fresh, project.as_deref()).await?;
            }
        }

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AntigravityError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AntigravityError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Antigravity quota request failed");
            return Err(AntigravityError::ApiError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                snippet(&body)
            )));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| AntigravityError::ParseError(e.to_string()))?;

        let records = to_records(&models, project.as_deref());
        if records.is_empty() {
            return Err(AntigravityError::NoQuotaInfo);
        }
        Ok(records)
    }

    async fn request_models(
        &self,
        access: &str,
        project: Option<&str>,
    ) -> Result<reqwest::Response, AntigravityError> {
        let url = format!("{}{}", self.base_url, MODELS_ENDPOINT);
        let body = serde_json::json!({ "project": project.unwrap_or(UNKNOWN_PROJECT) });
        debug!(url = %url, "Fetching Antigravity quota");

        self.http
            .post(&url)
            .header("Authorization", format!("Bearer {access}"))
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await
            .map_err(AntigravityError::from)
    }
}

// ============================================================================
// Response Normalization
// ============================================================================

/// Converts a decoded response into tier records, sorted by tier label.
fn to_records(response: &ModelsResponse, project: Option<&str>) -> Vec<QuotaRecord> {
    let mut records: Vec<QuotaRecord> = response
        .models
        .iter()
        .filter_map(|(key, model)| {
            let quota = model.quota_info.as_ref()?;
            let resets_at = quota.reset_time.as_deref().and_then(parse_reset_time);
            let window =
                QuotaWindow::from_remaining_fraction(quota.remaining_fraction.unwrap_or(0.0), resets_at);

            let mut record = QuotaRecord::ok(ProviderKind::GoogleAntigravity)
                .with_tier(tier_label(key, model.display_name.as_deref()))
                .with_daily(window);
            record.account = project.map(str::to_string);
            Some(record)
        })
        .collect();

    records.sort_by(|a, b| a.tier.cmp(&b.tier));
    records
}

/// Maps a model key onto its display tier.
///
/// The key-substring heuristic collapses model variants (`-high`, `-low`,
/// `-thinking`) into one label per tier; unmatched models fall back to the
/// reported display name, then the raw key.
fn tier_label(key: &str, display_name: Option<&str>) -> String {
    let lower = key.to_lowercase();
    if lower.contains("flash") {
        "G3Flash".to_string()
    } else if lower.contains("pro") {
        "G3Pro".to_string()
    } else if lower.contains("claude") {
        "Claude".to_string()
    } else if lower.contains("gpt") || lower.contains("o1") {
        "GPT/O1".to_string()
    } else {
        display_name
            .filter(|name| !name.is_empty())
            .unwrap_or(key)
            .to_string()
    }
}

fn parse_reset_time(s: &str) -> Option<DateTime<Utc>> {
    // Try ISO8601/RFC3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try unix timestamp (seconds)
    if let Ok(secs) = s.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    None
}

/// Clips an error body to a short, char-boundary-safe prefix.
fn snippet(body: &str) -> &str {
    if body.len() <= BODY_SNIPPET_LEN {
        return body;
    }
    let mut end = BODY_SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

// ============================================================================
// Tests
// ============================================================================
