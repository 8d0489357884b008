//! Antigravity-specific error types.

use opm_core::QuotaStatus;
use thiserror::Error;

/// Errors that can occur during Antigravity quota fetching.
#[derive(Debug, Error)]
pub enum AntigravityError {
    /// The token carries neither a usable access token nor a refresh token.
    #[error("no usable access or refresh token")]
    NoCredentials,

    /// The OAuth refresh exchange failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// The quota endpoint rejected the token, even after a refresh attempt.
    #[error("access token rejected")]
    Unauthorized,

    /// The quota endpoint rate-limited the request.
    #[error("rate limited by the quota endpoint")]
    RateLimited,

    /// Non-success response outside the classified cases.
    #[error("quota endpoint error: {0}")]
    ApiError(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    ParseError(String),

    /// The response decoded cleanly but listed no model with quota figures.
    #[error("no quota info in response")]
    NoQuotaInfo,
}

impl AntigravityError {
    /// Classifies this error as a per-token fetch status.
    pub fn to_status(&self) -> QuotaStatus {
        match self {
            Self::Unauthorized => QuotaStatus::Unauthorized,
            Self::RateLimited => QuotaStatus::RateLimited,
            other => QuotaStatus::failed(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AntigravityError {
    fn from(err: reqwest::Error) -> Self {
        AntigravityError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for AntigravityError {
    fn from(err: serde_json::Error) -> Self {
        AntigravityError::ParseError(err.to_string())
    }
}
