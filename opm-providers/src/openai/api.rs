//! OpenAI usage API client.
//!
//! # API Endpoint
//!
//! ```text
//! GET https://chatgpt.com/backend-api/wham/usage
//! Authorization: Bearer <access_token>
//! ChatGPT-Account-Id: <account_id>        (when known)
//! ```
//!
//! # Response Format
//!
//! ```json
//! {
//!   "rate_limit": {
//!     "primary_window": {
//!       "used_percent": 25.0,
//!       "reset_at": 1767225600,
//!       "reset_after_seconds": 14800
//!     },
//!     "secondary_window": { "used_percent": 60.5, "reset_after_seconds": 300000 }
//!   }
//! }
//! ```
//!
//! The primary window rolls daily, the secondary weekly. Every field is
//! optional in practice; `reset_at` arrives as epoch seconds or milliseconds
//! depending on backend version.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use opm_core::{from_epoch_auto, ProviderKind, QuotaRecord, QuotaStatus, QuotaWindow, TokenRecord};

use super::auth::account_id_from_jwt;
use super::error::OpenAiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the ChatGPT backend.
pub const API_BASE_URL: &str = "https://chatgpt.com";

/// Usage endpoint path.
pub const USAGE_ENDPOINT: &str = "/backend-api/wham/usage";

/// User agent sent with usage calls.
pub const USER_AGENT: &str = "opm-quota/1.0";

/// Per-request timeout.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Error-body prefix length kept in failure details.
const BODY_SNIPPET_LEN: usize = 120;

// ============================================================================
// API Response Structures
// ============================================================================

/// Top-level usage response.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageResponse {
    /// Rate-limit windows, absent on accounts without limits.
    pub rate_limit: Option<RateLimitInfo>,
}

/// The pair of usage windows in a usage response.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitInfo {
    /// Short (daily) window.
    pub primary_window: Option<UsageWindow>,
    /// Long (weekly) window.
    pub secondary_window: Option<UsageWindow>,
}

/// One usage window as reported by the endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageWindow {
    /// Percentage of the window already consumed.
    pub used_percent: Option<f64>,
    /// Absolute reset time, epoch seconds or milliseconds.
    pub reset_at: Option<f64>,
    /// Relative reset delay in seconds, used when `reset_at` is absent.
    pub reset_after_seconds: Option<f64>,
}

impl UsageWindow {
    /// Normalizes this window, resolving the reset time against `now`.
    pub fn to_quota_window(&self, now: DateTime<Utc>) -> QuotaWindow {
        let resets_at = self
            .reset_at
            .and_then(from_epoch_auto)
            .or_else(|| self.resets_after(now));
        QuotaWindow::from_used_percent(self.used_percent.unwrap_or(0.0), resets_at)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn resets_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let seconds = self.reset_after_seconds.filter(|s| s.is_finite() && *s > 0.0)?;
        Some(now + Duration::milliseconds((seconds * 1000.0) as i64))
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Client for the ChatGPT usage endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiQuotaClient {
    base_url: String,
    http: reqwest::Client,
}

impl Default for OpenAiQuotaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiQuotaClient {
    /// Creates a client against the production endpoint.
    pub fn new() -> Self {
        Self::with_base_url(API_BASE_URL)
    }

    /// Creates a client against a custom base URL (primarily for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Fetches usage for `token` and normalizes it into a [`QuotaRecord`].
    ///
    /// A token known to be expired short-circuits without a network call.
    /// HTTP 429 bodies are still decoded when possible so that figures can
    /// accompany the rate-limited status.
    ///
    /// # Errors
    /// Returns [`OpenAiError`] for missing/expired tokens, transport
    /// failures, endpoint rejections, and undecodable bodies.
    #[instrument(skip(self, token), fields(account = token.account.as_deref()))]
    pub async fn fetch_quota(
        &self,
        token: &TokenRecord,
        now: DateTime<Utc>,
    ) -> Result<QuotaRecord, OpenAiError> {
        let access = token
            .access
            .as_deref()
            .filter(|access| !access.is_empty())
            .ok_or(OpenAiError::MissingAccessToken)?;
        if token.is_expired(now) {
            return Err(OpenAiError::TokenExpired);
        }

        let account = token
            .account
            .clone()
            .or_else(|| account_id_from_jwt(access));

        let url = format!("{}{}", self.base_url, USAGE_ENDPOINT);
        debug!(url = %url, "Fetching OpenAI usage");

        let mut request = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {access}"))
            .header("User-Agent", USER_AGENT);
        if let Some(id) = &account {
            request = request.header("ChatGPT-Account-Id", id.clone());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(OpenAiError::Unauthorized(status.as_u16()));
        }

        let body = response.text().await?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            // A throttled response sometimes still carries the windows.
            if let Ok(usage) = serde_json::from_str::<UsageResponse>(&body) {
                if usage.rate_limit.is_some() {
                    return Ok(Self::to_record(&usage, account, QuotaStatus::RateLimited, now));
                }
            }
            return Err(OpenAiError::RateLimited);
        }

        if !status.is_success() {
            warn!(status = %status, "OpenAI usage request failed");
            return Err(OpenAiError::ApiError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                snippet(&body)
            )));
        }

        let usage: UsageResponse = serde_json::from_str(&body)
            .map_err(|e| OpenAiError::ParseError(format!("unexpected response shape: {e}")))?;

        Ok(Self::to_record(&usage, account, QuotaStatus::Ok, now))
    }

    /// Builds the normalized record from a decoded usage response.
    fn to_record(
        usage: &UsageResponse,
        account: Option<String>,
        status: QuotaStatus,
        now: DateTime<Utc>,
    ) -> QuotaRecord {
        let mut record = QuotaRecord::new(ProviderKind::Openai, status);
        record.account = account;
        if let Some(limits) = &usage.rate_limit {
            if let Some(primary) = &limits.primary_window {
                record = record.with_daily(primary.to_quota_window(now));
            }
            if let Some(secondary) = &limits.secondary_window {
                record = record.with_weekly(secondary.to_quota_window(now));
            }
        }
        record
    }
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
