//! Antigravity OAuth token refresh.
//!
//! Antigravity access tokens are short-lived; the refresh token is the
//! durable credential. This module performs the standard Google OAuth
//! refresh-token exchange using the Antigravity desktop client's public
//! OAuth application credentials (a desktop-app client secret is not a
//! confidential value).
//!
//! The refreshed access token is returned to the caller and never written
//! back to any credential file.

use serde::Deserialize;
use tracing::debug;

use super::error::AntigravityError;

// ============================================================================
// Constants
// ============================================================================

/// OAuth client id of the Antigravity desktop application.
pub const CLIENT_ID: &str =
    "1071006060591-tmhssin2h21lcre235vtolojh4g403ep.apps.googleusercontent.com";

/// OAuth client secret of the Antigravity desktop application.
pub const CLIENT_SECRET: &str = "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";

/// Google OAuth token endpoint.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

// ============================================================================
// Refresh Exchange
// ============================================================================

/// Response from the token endpoint. Only the access token is consumed.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: Option<String>,
}

/// Exchanges refresh tokens for fresh access tokens.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    token_url: String,
    http: reqwest::Client,
}

impl TokenRefresher {
    /// Creates a refresher against the production token endpoint.
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_token_url(http, TOKEN_URL)
    }

    /// Creates a refresher against a custom token endpoint (for testing).
    pub fn with_token_url(http: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            http,
        }
    }

    /// Exchanges `refresh_token` for an access token.
    ///
    /// # Errors
    /// Any failure in the exchange (transport, non-2xx status, missing or
    /// empty `access_token` in the body) comes back as
    /// [`AntigravityError::RefreshFailed`].
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AntigravityError> {
        debug!("Refreshing Antigravity access token");

        let params = [
            ("client_id", CLIENT_ID),
            ("client_secret", CLIENT_SECRET),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AntigravityError::RefreshFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AntigravityError::RefreshFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| AntigravityError::RefreshFailed(e.to_string()))?;

        body.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AntigravityError::RefreshFailed("no access token in response".to_string())
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
