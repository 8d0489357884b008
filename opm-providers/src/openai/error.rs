//! OpenAI-specific error types.

use opm_core::QuotaStatus;
use thiserror::Error;

/// Errors that can occur during OpenAI usage fetching.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// The credential entry carries no access token.
    #[error("no access token")]
    MissingAccessToken,

    /// The stored access token is past its recorded expiry.
    #[error("access token expired")]
    TokenExpired,

    /// The endpoint rejected the token.
    #[error("access token rejected (HTTP {0})")]
    Unauthorized(u16),

    /// The endpoint rate-limited the request.
    #[error("rate limited by the usage endpoint")]
    RateLimited,

    /// Non-success response outside the classified cases.
    #[error("usage endpoint error: {0}")]
    ApiError(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    ParseError(String),
}

impl OpenAiError {
    /// Classifies this error as a per-token fetch status.
    ///
    /// Rejections and rate limits keep their dedicated status so the quota
    /// table can label them; everything else collapses into a failure whose
    /// detail is this error's display form.
    pub fn to_status(&self) -> QuotaStatus {
        match self {
            Self::Unauthorized(_) => QuotaStatus::Unauthorized,
            Self::RateLimited => QuotaStatus::RateLimited,
            other => QuotaStatus::failed(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for OpenAiError {
    fn from(err: reqwest::Error) -> Self {
        OpenAiError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for OpenAiError {
    fn from(err: serde_json::Error) -> Self {
        OpenAiError::ParseError(err.to_string())
    }
}
