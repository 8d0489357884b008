//! Google Antigravity provider.
//!
//! Extracts the OAuth login OpenCode stores under the `"google"` service key
//! and queries the Cloud Code API for per-model quota. One fetch yields one
//! record per model tier (G3Pro, G3Flash, Claude, ...), each with its own
//! remaining fraction and reset time.
//!
//! Antigravity can also hold extra Google accounts in a sidecar file next to
//! the OpenCode config; [`load_external_accounts`] picks those up so their
//! quota shows alongside the main login.
//!
//! ## Usage
//!
//! ```ignore
//! use chrono::Utc;
//! use opm_providers::antigravity;
//!
//! let token = antigravity::extract_token(&document).ok_or("no Antigravity login")?;
//! let client = antigravity::AntigravityQuotaClient::new();
//! let records = client.fetch_quota(&token, Utc::now()).await?;
//! ```
//!
//! Access tokens here are short-lived; the client refreshes through the
//! Google OAuth endpoint when the stored one is expired or rejected, without
//! ever writing the fresh token back.

// Modules
mod accounts;
mod api;
mod auth;
mod error;
mod oauth;

// Re-exports
pub use accounts::{
    candidate_paths, load_external_accounts, read_accounts_file, ExternalAccount,
    ACCOUNTS_FILE_NAME,
};
pub use api::{
    AntigravityQuotaClient, ModelEntry, ModelsResponse, QuotaInfo, API_BASE_URL, MODELS_ENDPOINT,
    UNKNOWN_PROJECT, USER_AGENT,
};
pub use auth::{extract_token, SERVICE_KEY};
pub use error::AntigravityError;
pub use oauth::{TokenRefresher, CLIENT_ID, CLIENT_SECRET, TOKEN_URL};
