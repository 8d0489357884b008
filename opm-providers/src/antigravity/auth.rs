//! Antigravity credential extraction.
//!
//! OpenCode stores the Antigravity login under the `"google"` service key:
//!
//! ```json
//! {
//!   "google": {
//!     "type": "oauth",
//!     "access": "ya29...",
//!     "refresh": "1//0g...",
//!     "expires": 1767225600000,
//!     "project_id": "my-project"
//!   }
//! }
//! ```
//!
//! Unlike OpenAI, the refresh token matters here: access tokens expire within
//! the hour and the quota client refreshes on demand. The project id field
//! name has drifted across Antigravity versions, so three spellings are
//! probed.

use serde_json::Value;

use opm_core::{from_epoch_auto, AuthDocument, ProviderKind, TokenRecord};

/// Service key of the Antigravity OAuth entry.
pub const SERVICE_KEY: &str = "google";

/// Project id field spellings, in preference order.
const PROJECT_KEYS: [&str; 3] = ["project_id", "project", "projectId"];

/// Extracts the Antigravity token from a credential document.
///
/// The `"google"` entry must be an OAuth object. Access and refresh tokens
/// are both optional individually, but an entry carrying neither is skipped.
/// The project id lands in the record's `account` field.
pub fn extract_token(document: &AuthDocument) -> Option<TokenRecord> {
    let entry = document.get(SERVICE_KEY)?.as_object()?;
    if entry.get("type").and_then(Value::as_str) != Some("oauth") {
        return None;
    }

    let mut record = TokenRecord::new(ProviderKind::GoogleAntigravity);
    if let Some(access) = entry
        .get("access")
        .and_then(Value::as_str)
        .filter(|access| !access.is_empty())
    {
        record = record.with_access(access);
    }
    if let Some(refresh) = entry
        .get("refresh")
        .and_then(Value::as_str)
        .filter(|refresh| !refresh.is_empty())
    {
        record = record.with_refresh(refresh);
    }
    if let Some(expires_at) = entry
        .get("expires")
        .and_then(Value::as_f64)
        .and_then(from_epoch_auto)
    {
        record = record.with_expires_at(expires_at);
    }
    if let Some(project) = PROJECT_KEYS.iter().find_map(|key| {
        entry
            .get(*key)
            .and_then(Value::as_str)
            .filter(|project| !project.is_empty())
    }) {
        record = record.with_account(project);
    }

    record.has_any_credential().then_some(record)
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

    #[test]
    fn test_extract_full_entry() {
        let doc = document(json!({
            "google": {
                "type": "oauth",
                "access": "ya29.tok",
                "refresh": "1//0g",
                "expires": 1_767_225_600_000_i64,
                "project_id": "proj-1"
            }
        }));

        let record = extract_token(&doc).unwrap();
        assert_eq!(record.provider, ProviderKind::GoogleAntigravity);
        assert_eq!(record.access.as_deref(), Some("ya29.tok"));
        assert_eq!(record.refresh.as_deref(), Some("1//0g"));
        assert_eq!(record.account.as_deref(), Some("proj-1"));
        assert_eq!(record.expires_at.unwrap().timestamp(), 1_767_225_600);
    }

    #[test]
    fn test_extract_refresh_only_entry() {
        let doc = document(json!({
            "google": {"type": "oauth", "refresh": "1//0g"}
        }));

        let record = extract_token(&doc).unwrap();
        assert!(record.access.is_none());
        assert_eq!(record.refresh.as_deref(), Some("1//0g"));
    }

    #[test]
    fn test_extract_skips_entry_without_any_token() {
        let doc = document(json!({
            "google": {"type": "oauth", "project_id": "proj-1"}
        }));
        assert!(extract_token(&doc).is_none());

        let empty = document(json!({
            "google": {"type": "oauth", "access": "", "refresh": ""}
        }));
        assert!(extract_token(&empty).is_none());
    }

    #[test]
    fn test_extract_rejects_non_oauth_entry() {
        let doc = document(json!({
            "google": {"type": "api", "key": "AIza..."}
        }));
        assert!(extract_token(&doc).is_none());
    }

    #[test]
    fn test_project_key_spellings() {
        for (entry, expected) in [
            (json!({"type": "oauth", "access": "t", "project": "alt"}), "alt"),
            (json!({"type": "oauth", "access": "t", "projectId": "camel"}), "camel"),
            (
                json!({"type": "oauth", "access": "t", "project_id": "snake", "projectId": "camel"}),
                "snake",
            ),
        ] {
            let doc = document(json!({ "google": entry }));
            let record = extract_token(&doc).unwrap();
            assert_eq!(record.account.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_extract_ignores_other_services() {
        let doc = document(json!({
            "openai": {"type": "oauth", "access": "tok"}
        }));
        assert!(extract_token(&doc).is_none());
    }
}
