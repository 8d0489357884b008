//! OpenAI (Codex) provider.
//!
//! Extracts the OAuth login OpenCode stores under the `"codex"` (or legacy
//! `"openai"`) service key and queries the ChatGPT backend usage API for the
//! daily and weekly rate-limit windows.
//!
//! ## Usage
//!
//! ```ignore
//! use chrono::Utc;
//! use opm_providers::openai;
//!
//! let token = openai::extract_token(&document).ok_or("no OpenAI login")?;
//! let client = openai::OpenAiQuotaClient::new();
//! let record = client.fetch_quota(&token, Utc::now()).await?;
//! ```
//!
//! OpenAI tokens are never refreshed here: the stored access token is used
//! as-is and an expired one is reported as a failure instead of triggering
//! a network call.

// Modules
mod api;
mod auth;
mod error;

// Re-exports
pub use api::{
    OpenAiQuotaClient, RateLimitInfo, UsageResponse, UsageWindow, API_BASE_URL, USAGE_ENDPOINT,
    USER_AGENT,
};
pub use auth::{
    account_id_from_jwt, decode_jwt_payload, extract_token, JwtPayload, OpenAiAuthClaims,
    SERVICE_KEYS,
};
pub use error::OpenAiError;
