//! Concurrent quota fetching.
//!
//! Each unique token is fetched exactly once. Calls run through a small
//! semaphore-bounded pool so a long preset list cannot open dozens of
//! simultaneous connections against the same two endpoints.
//!
//! Failures stay per-token: a fetcher returns records, never errors, and a
//! token that cannot be fetched yields a single failure-status record while
//! the rest of the batch proceeds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use opm_core::{ProviderKind, QuotaRecord, QuotaStatus, TokenRecord};
use opm_providers::antigravity::AntigravityQuotaClient;
use opm_providers::openai::OpenAiQuotaClient;

use crate::collect::UniqueToken;

/// Maximum provider calls in flight at once.
pub const MAX_CONCURRENT_FETCHES: usize = 4;

// ============================================================================
// Fetcher Trait
// ============================================================================

/// One provider fetch for one token.
///
/// Implementations return records, never errors: a token's failure becomes
/// a failure-status record so the rest of the batch is unaffected.
#[async_trait]
pub trait QuotaFetcher: Send + Sync {
    /// Fetches the quota records for `token`.
    async fn fetch(&self, token: &TokenRecord, now: DateTime<Utc>) -> Vec<QuotaRecord>;
}

/// The production fetcher, dispatching on the token's provider.
pub struct ProviderFetcher {
    openai: OpenAiQuotaClient,
    antigravity: AntigravityQuotaClient,
}

impl ProviderFetcher {
    /// Creates a fetcher against the production endpoints.
    pub fn new() -> Self {
        Self {
            openai: OpenAiQuotaClient::new(),
            antigravity: AntigravityQuotaClient::new(),
        }
    }
}

impl Default for ProviderFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuotaFetcher for ProviderFetcher {
    async fn fetch(&self, token: &TokenRecord, now: DateTime<Utc>) -> Vec<QuotaRecord> {
        match token.provider {
            ProviderKind::Openai => match self.openai.fetch_quota(token, now).await {
                Ok(record) => vec![record],
                Err(err) => vec![failure_record(token, err.to_status())],
            },
            ProviderKind::GoogleAntigravity => {
                match self.antigravity.fetch_quota(token, now).await {
                    Ok(records) => records,
                    Err(err) => vec![failure_record(token, err.to_status())],
                }
            }
        }
    }
}

fn failure_record(token: &TokenRecord, status: QuotaStatus) -> QuotaRecord {
    let mut record = QuotaRecord::new(token.provider, status);
    record.account = token.account.clone();
    record
}

// ============================================================================
// Bounded Pool
// ============================================================================

/// Fetches all tokens through `fetcher` with bounded concurrency.
///
/// Results come back paired with their tokens, in input order regardless of
/// completion order.
#[instrument(skip(fetcher, tokens), fields(tokens = tokens.len()))]
pub async fn fetch_all(
    fetcher: Arc<dyn QuotaFetcher>,
    tokens: Vec<UniqueToken>,
    now: DateTime<Utc>,
) -> Vec<(UniqueToken, Vec<QuotaRecord>)> {
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES));

    let tasks: Vec<_> = tokens
        .into_iter()
        .map(|token| {
            let fetcher = Arc::clone(&fetcher);
            let semaphore = Arc::clone(&semaphore);
            async move {
                // The semaphore is never closed; acquire cannot fail here.
                let _permit = semaphore.acquire().await.ok();
                debug!(provider = %token.record.provider, "Fetching quota");
                let records = fetcher.fetch(&token.record, now).await;
                (token, records)
            }
        })
        .collect();

    join_all(tasks).await
}

// ============================================================================
// Tests
// ============================================================================
