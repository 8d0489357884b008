//! Token collection and deduplication.
//!
//! Tokens are collected in a fixed order (active file, external accounts,
//! presets) and deduplicated as they arrive. Two records are the same
//! account when the provider matches and either the access-token values or
//! the refresh-token values match; access tokens rotate under a stable
//! refresh token, so either value identifies the account.
//!
//! Merging also enriches: a stored record missing its refresh token, or
//! holding an expired access token, adopts the better values from later
//! sightings of the same account. The fetch layer then works with the best
//! credential any source had.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use opm_core::{AuthDocument, Origin, ProviderKind, TokenRecord};
use opm_providers::antigravity::{self, ExternalAccount};
use opm_providers::openai;

// ============================================================================
// Sources
// ============================================================================

/// Everything the engine scans for tokens.
#[derive(Debug, Default)]
pub struct QuotaSources {
    /// The active credential document, when one exists and is readable.
    pub active: Option<AuthDocument>,
    /// Stored presets as `(name, document)` pairs, in name order.
    pub presets: Vec<(String, AuthDocument)>,
    /// Entries of the external Antigravity accounts file.
    pub external: Vec<ExternalAccount>,
}

/// One deduplicated credential and every place it was found.
#[derive(Debug, Clone)]
pub struct UniqueToken {
    /// The merged credential.
    pub record: TokenRecord,
    /// Origins sharing this credential, in discovery order.
    pub origins: Vec<Origin>,
}

// ============================================================================
// Collection
// ============================================================================

/// Scans all sources and returns deduplicated tokens in discovery order.
pub fn collect_tokens(sources: &QuotaSources, now: DateTime<Utc>) -> Vec<UniqueToken> {
    let mut collector = Collector::default();

    if let Some(active) = &sources.active {
        collector.add_document(active, Origin::ActiveFile, now);
    }
    for account in &sources.external {
        let email = account.email.clone().unwrap_or_else(|| "User".to_string());
        collector.add(external_token(account), Origin::External(email), now);
    }
    for (name, document) in &sources.presets {
        collector.add_document(document, Origin::Preset(name.clone()), now);
    }

    debug!(count = collector.tokens.len(), "Collected unique tokens");
    collector.tokens
}

fn external_token(account: &ExternalAccount) -> TokenRecord {
    let mut record =
        TokenRecord::new(ProviderKind::GoogleAntigravity).with_refresh(account.refresh.as_str());
    if let Some(project) = &account.project {
        record = record.with_account(project.as_str());
    }
    record
}

// ============================================================================
// Collector
// ============================================================================

#[derive(Default)]
struct Collector {
    tokens: Vec<UniqueToken>,
    by_access: HashMap<(ProviderKind, String), usize>,
    by_refresh: HashMap<(ProviderKind, String), usize>,
}

impl Collector {
    fn add_document(&mut self, document: &AuthDocument, origin: Origin, now: DateTime<Utc>) {
        if let Some(record) = openai::extract_token(document) {
            self.add(record, origin.clone(), now);
        }
        if let Some(record) = antigravity::extract_token(document) {
            self.add(record, origin, now);
        }
    }

    fn add(&mut self, record: TokenRecord, origin: Origin, now: DateTime<Utc>) {
        match self.find(&record) {
            Some(index) => self.merge(index, &record, origin, now),
            None => {
                let index = self.tokens.len();
                self.register(index, &record);
                self.tokens.push(UniqueToken {
                    record,
                    origins: vec![origin],
                });
            }
        }
    }

    fn find(&self, record: &TokenRecord) -> Option<usize> {
        let provider = record.provider;
        record
            .access
            .as_ref()
            .filter(|access| !access.is_empty())
            .and_then(|access| self.by_access.get(&(provider, access.clone())))
            .or_else(|| {
                record
                    .refresh
                    .as_ref()
                    .filter(|refresh| !refresh.is_empty())
                    .and_then(|refresh| self.by_refresh.get(&(provider, refresh.clone())))
            })
            .copied()
    }

    fn merge(&mut self, index: usize, incoming: &TokenRecord, origin: Origin, now: DateTime<Utc>) {
        let token = &mut self.tokens[index];
        if !token.origins.contains(&origin) {
            token.origins.push(origin);
        }

        if token.record.refresh.is_none() && incoming.refresh.is_some() {
            token.record.refresh.clone_from(&incoming.refresh);
        }
        if incoming.has_usable_access(now) && !token.record.has_usable_access(now) {
            token.record.access.clone_from(&incoming.access);
            token.record.expires_at = incoming.expires_at;
        }
        if token.record.account.is_none() && incoming.account.is_some() {
            token.record.account.clone_from(&incoming.account);
        }

        // Alias every value the incoming record carried, so later sightings
        // of either value land on this same token.
        self.register(index, incoming);
    }

    fn register(&mut self, index: usize, record: &TokenRecord) {
        if let Some(access) = record.access.clone().filter(|access| !access.is_empty()) {
            self.by_access.insert((record.provider, access), index);
        }
        if let Some(refresh) = record.refresh.clone().filter(|refresh| !refresh.is_empty()) {
            self.by_refresh.insert((record.provider, refresh), index);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn document(value: serde_json::Value) -> AuthDocument {
        AuthDocument::parse(&value.to_string()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_200_000, 0).unwrap()
    }

    #[test]
    fn test_collect_from_active_document() {
        let sources = QuotaSources {
            active: Some(document(json!({
                "codex": {"type": "oauth", "access": "oa-1"},
                "google": {"type": "oauth", "refresh": "g-r1", "project_id": "proj"}
            }))),
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].record.provider, ProviderKind::Openai);
        assert_eq!(tokens[0].origins, vec![Origin::ActiveFile]);
        assert_eq!(tokens[1].record.provider, ProviderKind::GoogleAntigravity);
        assert_eq!(tokens[1].record.account.as_deref(), Some("proj"));
    }

    #[test]
    fn test_same_access_merges_origins() {
        let sources = QuotaSources {
            active: Some(document(json!({
                "codex": {"type": "oauth", "access": "oa-1"}
            }))),
            presets: vec![
                (
                    "work".to_string(),
                    document(json!({"codex": {"type": "oauth", "access": "oa-1"}})),
                ),
                (
                    "personal".to_string(),
                    document(json!({"codex": {"type": "oauth", "access": "oa-2"}})),
                ),
            ],
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0].origins,
            vec![Origin::ActiveFile, Origin::Preset("work".to_string())]
        );
        assert_eq!(tokens[1].origins, vec![Origin::Preset("personal".to_string())]);
    }

    #[test]
    fn test_rotated_access_matches_by_refresh() {
        let sources = QuotaSources {
            active: Some(document(json!({
                "google": {"type": "oauth", "access": "a-new", "refresh": "r-1"}
            }))),
            presets: vec![(
                "work".to_string(),
                document(json!({
                    "google": {"type": "oauth", "access": "a-stale", "refresh": "r-1"}
                })),
            )],
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].origins.len(), 2);
        // The active file's usable access token is kept.
        assert_eq!(tokens[0].record.access.as_deref(), Some("a-new"));
    }

    #[test]
    fn test_merge_adopts_missing_refresh_token() {
        let sources = QuotaSources {
            active: Some(document(json!({
                "google": {"type": "oauth", "access": "a-1"}
            }))),
            presets: vec![(
                "work".to_string(),
                document(json!({
                    "google": {"type": "oauth", "access": "a-1", "refresh": "r-1"}
                })),
            )],
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].record.refresh.as_deref(), Some("r-1"));
    }

    #[test]
    fn test_merge_replaces_expired_access() {
        let now = now();
        let expired_ms = (now - Duration::hours(1)).timestamp_millis();
        let valid_ms = (now + Duration::hours(1)).timestamp_millis();

        let sources = QuotaSources {
            active: Some(document(json!({
                "google": {
                    "type": "oauth", "access": "a-old", "refresh": "r-1",
                    "expires": expired_ms
                }
            }))),
            presets: vec![(
                "work".to_string(),
                document(json!({
                    "google": {
                        "type": "oauth", "access": "a-new", "refresh": "r-1",
                        "expires": valid_ms
                    }
                })),
            )],
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].record.access.as_deref(), Some("a-new"));
        assert!(tokens[0].record.has_usable_access(now));
    }

    #[test]
    fn test_transitive_identity_through_aliases() {
        // Preset one shares the access value with the active file; preset
        // two shares only the refresh value that preset one introduced.
        let sources = QuotaSources {
            active: Some(document(json!({
                "google": {"type": "oauth", "access": "a-1"}
            }))),
            presets: vec![
                (
                    "one".to_string(),
                    document(json!({
                        "google": {"type": "oauth", "access": "a-1", "refresh": "r-1"}
                    })),
                ),
                (
                    "two".to_string(),
                    document(json!({
                        "google": {"type": "oauth", "refresh": "r-1"}
                    })),
                ),
            ],
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].origins.len(), 3);
    }

    #[test]
    fn test_external_accounts_become_tokens() {
        let sources = QuotaSources {
            external: vec![
                ExternalAccount {
                    refresh: "r-x".to_string(),
                    project: Some("proj-x".to_string()),
                    email: Some("dev@example.com".to_string()),
                },
                ExternalAccount {
                    refresh: "r-y".to_string(),
                    project: None,
                    email: None,
                },
            ],
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].record.provider, ProviderKind::GoogleAntigravity);
        assert_eq!(tokens[0].record.account.as_deref(), Some("proj-x"));
        assert_eq!(
            tokens[0].origins,
            vec![Origin::External("dev@example.com".to_string())]
        );
        assert_eq!(tokens[1].origins, vec![Origin::External("User".to_string())]);
    }

    #[test]
    fn test_external_account_merges_with_stored_login() {
        let sources = QuotaSources {
            active: Some(document(json!({
                "google": {"type": "oauth", "access": "a-1", "refresh": "r-1"}
            }))),
            external: vec![ExternalAccount {
                refresh: "r-1".to_string(),
                project: Some("proj".to_string()),
                email: Some("dev@example.com".to_string()),
            }],
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].origins,
            vec![
                Origin::ActiveFile,
                Origin::External("dev@example.com".to_string())
            ]
        );
        // Project id backfilled from the external entry.
        assert_eq!(tokens[0].record.account.as_deref(), Some("proj"));
    }

    #[test]
    fn test_same_value_different_providers_stay_separate() {
        let sources = QuotaSources {
            active: Some(document(json!({
                "codex": {"type": "oauth", "access": "shared-value"},
                "google": {"type": "oauth", "access": "shared-value"}
            }))),
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_discovery_order_is_active_external_presets() {
        let sources = QuotaSources {
            active: Some(document(json!({
                "codex": {"type": "oauth", "access": "oa-active"}
            }))),
            presets: vec![(
                "work".to_string(),
                document(json!({"codex": {"type": "oauth", "access": "oa-preset"}})),
            )],
            external: vec![ExternalAccount {
                refresh: "r-ext".to_string(),
                project: None,
                email: Some("x@y.z".to_string()),
            }],
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens[0].origins[0], Origin::ActiveFile);
        assert_eq!(tokens[1].origins[0], Origin::External("x@y.z".to_string()));
        assert_eq!(tokens[2].origins[0], Origin::Preset("work".to_string()));
    }

    #[test]
    fn test_duplicate_origin_not_repeated() {
        // The same preset contributing the same credential twice (via access
        // and refresh lookups) must not double its origin.
        let sources = QuotaSources {
            active: Some(document(json!({
                "google": {"type": "oauth", "access": "a-1", "refresh": "r-1"}
            }))),
            external: vec![ExternalAccount {
                refresh: "r-1".to_string(),
                project: None,
                email: None,
            }],
            ..QuotaSources::default()
        };

        let tokens = collect_tokens(&sources, now());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].origins.len(), 2);
    }

    #[test]
    fn test_empty_sources_collect_nothing() {
        assert!(collect_tokens(&QuotaSources::default(), now()).is_empty());
    }

    #[test]
    fn test_documents_without_known_services_are_skipped() {
        let sources = QuotaSources {
            active: Some(document(json!({
                "anthropic": {"type": "oauth", "access": "tok"},
                "github": {"type": "api", "key": "ghp_x"}
            }))),
            ..QuotaSources::default()
        };

        assert!(collect_tokens(&sources, now()).is_empty());
    }
}
