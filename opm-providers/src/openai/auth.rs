//! OpenAI credential extraction and JWT payload inspection.
//!
//! OpenCode stores the Codex CLI login under the `"codex"` service key (older
//! installs used `"openai"`):
//!
//! ```json
//! {
//!   "codex": {
//!     "type": "oauth",
//!     "access": "eyJhbGciOi...",
//!     "refresh": "...",
//!     "expires": 1767225600000,
//!     "accountId": "acct-123"
//!   }
//! }
//! ```
//!
//! Only the access token is lifted into a [`TokenRecord`]; the usage endpoint
//! cannot consume a refresh token and this crate never refreshes OpenAI
//! credentials. When the entry has no `accountId`, the ChatGPT account id is
//! recovered from the access token's JWT claims instead.

use base64::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use opm_core::{from_epoch_auto, AuthDocument, ProviderKind, TokenRecord};

use super::error::OpenAiError;

/// Service keys probed for the OpenAI OAuth entry, in preference order.
pub const SERVICE_KEYS: [&str; 2] = ["codex", "openai"];

// ============================================================================
// Token Extraction
// ============================================================================

/// Extracts the OpenAI token from a credential document.
///
/// Probes `"codex"` first, then `"openai"`, and uses the first key present.
/// The entry must be an OAuth object with a non-empty access token; anything
/// else yields `None`. Expiry (`expires`, epoch milliseconds) and the stored
/// `accountId` are carried along when present.
pub fn extract_token(document: &AuthDocument) -> Option<TokenRecord> {
    let entry = SERVICE_KEYS.iter().find_map(|key| document.get(key))?;
    let entry = entry.as_object()?;
    if entry.get("type").and_then(Value::as_str) != Some("oauth") {
        return None;
    }

    let access = entry
        .get("access")
        .and_then(Value::as_str)
        .filter(|access| !access.is_empty())?;

    let mut record = TokenRecord::new(ProviderKind::Openai).with_access(access);
    if let Some(expires_at) = entry
        .get("expires")
        .and_then(Value::as_f64)
        .and_then(from_epoch_auto)
    {
        record = record.with_expires_at(expires_at);
    }
    if let Some(account) = entry
        .get("accountId")
        .and_then(Value::as_str)
        .filter(|account| !account.is_empty())
    {
        record = record.with_account(account);
    }
    Some(record)
}

// ============================================================================
// JWT Payload
// ============================================================================

/// JWT payload claims used for account resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtPayload {
    /// OpenAI-specific claims, namespaced under their issuer URL.
    #[serde(rename = "https://api.openai.com/auth")]
    pub openai_auth: Option<OpenAiAuthClaims>,
}

/// The OpenAI claim block embedded in access tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiAuthClaims {
    /// ChatGPT account identifier.
    pub chatgpt_account_id: Option<String>,
}

/// Decodes a JWT and deserializes its payload claims.
///
/// The signature is not validated; only the payload is read. Tokens are
/// expected to use URL-safe unpadded base64, with standard base64 accepted
/// as a fallback.
///
/// # Errors
/// Returns a parse error if the token is not a three-part JWT or the payload
/// is not valid base64/UTF-8/JSON.
pub fn decode_jwt_payload(token: &str) -> Result<JwtPayload, OpenAiError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(OpenAiError::ParseError(format!(
            "invalid JWT format: expected 3 parts, got {}",
            parts.len()
        )));
    }

    let decoded = BASE64_URL_SAFE_NO_PAD
        .decode(parts[1])
        .or_else(|_| BASE64_STANDARD.decode(parts[1]))
        .map_err(|e| OpenAiError::ParseError(format!("base64 decode error: {e}")))?;

    let payload = String::from_utf8(decoded)
        .map_err(|e| OpenAiError::ParseError(format!("UTF-8 decode error: {e}")))?;

    trace!(payload = %payload, "Decoded JWT payload");

    serde_json::from_str(&payload)
        .map_err(|e| OpenAiError::ParseError(format!("JSON parse error: {e}")))
}

/// Best-effort ChatGPT account id from the access token's JWT claims.
///
/// Returns `None` for opaque (non-JWT) tokens or tokens without the claim.
pub fn account_id_from_jwt(token: &str) -> Option<String> {
    decode_jwt_payload(token)
        .ok()
        .and_then(|payload| payload.openai_auth)
        .and_then(|claims| claims.chatgpt_account_id)
        .filter(|id| !id.is_empty())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> AuthDocument {
        AuthDocument::parse(&value.to_string()).unwrap()
    }

    fn encode_jwt(payload: &serde_json::Value) -> String {
        let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
        let body = BASE64_URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_extract_prefers_codex_key() {
        let doc = document(json!({
            "codex": {"type": "oauth", "access": "codex-token"},
            "openai": {"type": "oauth", "access": "openai-token"}
        }));

        let record = extract_token(&doc).unwrap();
        assert_eq!(record.provider, ProviderKind::Openai);
        assert_eq!(record.access.as_deref(), Some("codex-token"));
    }

    #[test]
    fn test_extract_falls_back_to_openai_key() {
        let doc = document(json!({
            "openai": {"type": "oauth", "access": "openai-token"}
        }));

        let record = extract_token(&doc).unwrap();
        assert_eq!(record.access.as_deref(), Some("openai-token"));
    }

    #[test]
    fn test_extract_reads_expiry_and_account() {
        let doc = document(json!({
            "codex": {
                "type": "oauth",
                "access": "tok",
                "expires": 1_767_225_600_000_i64,
                "accountId": "acct-9"
            }
        }));

        let record = extract_token(&doc).unwrap();
        assert_eq!(record.account.as_deref(), Some("acct-9"));
        let expires = record.expires_at.unwrap();
        assert_eq!(expires.timestamp(), 1_767_225_600);
    }

    #[test]
    fn test_extract_rejects_non_oauth_entry() {
        let doc = document(json!({
            "codex": {"type": "api", "key": "sk-123"}
        }));
        assert!(extract_token(&doc).is_none());
    }

    #[test]
    fn test_extract_requires_access_token() {
        let empty = document(json!({
            "codex": {"type": "oauth", "access": "", "refresh": "r1"}
        }));
        assert!(extract_token(&empty).is_none());

        let missing = document(json!({
            "codex": {"type": "oauth", "refresh": "r1"}
        }));
        assert!(extract_token(&missing).is_none());
    }

    #[test]
    fn test_extract_ignores_unrelated_services() {
        let doc = document(json!({
            "anthropic": {"type": "oauth", "access": "tok"}
        }));
        assert!(extract_token(&doc).is_none());
    }

    #[test]
    fn test_decode_jwt_payload() {
        let token = encode_jwt(&json!({
            "sub": "user-1",
            "https://api.openai.com/auth": {"chatgpt_account_id": "acct-42"}
        }));

        let payload = decode_jwt_payload(&token).unwrap();
        let claims = payload.openai_auth.unwrap();
        assert_eq!(claims.chatgpt_account_id.as_deref(), Some("acct-42"));
    }

    #[test]
    fn test_decode_jwt_without_openai_claims() {
        let token = encode_jwt(&json!({"sub": "user-1"}));
        let payload = decode_jwt_payload(&token).unwrap();
        assert!(payload.openai_auth.is_none());
    }

    #[test]
    fn test_decode_jwt_rejects_malformed_token() {
        assert!(decode_jwt_payload("not-a-jwt").is_err());
        assert!(decode_jwt_payload("a.b").is_err());
        assert!(decode_jwt_payload("a.!!!.c").is_err());
    }

    #[test]
    fn test_account_id_from_jwt() {
        let token = encode_jwt(&json!({
            "https://api.openai.com/auth": {"chatgpt_account_id": "acct-7"}
        }));
        assert_eq!(account_id_from_jwt(&token).as_deref(), Some("acct-7"));
    }

    #[test]
    fn test_account_id_absent_for_opaque_token() {
        assert!(account_id_from_jwt("opaque-token").is_none());

        let token = encode_jwt(&json!({"sub": "user-1"}));
        assert!(account_id_from_jwt(&token).is_none());
    }
}
