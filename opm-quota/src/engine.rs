//! The aggregation pipeline, end to end.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::collect::{collect_tokens, QuotaSources};
use crate::fetch::{fetch_all, ProviderFetcher, QuotaFetcher};
use crate::report::QuotaReport;

/// Aggregates quota across every stored credential.
///
/// Scan, deduplicate, fetch once per unique token, fan back out. The
/// fetcher is pluggable so the pipeline can be exercised without network
/// access.
pub struct QuotaEngine {
    fetcher: Arc<dyn QuotaFetcher>,
}

impl QuotaEngine {
    /// Creates an engine with the production provider clients.
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(ProviderFetcher::new()))
    }

    /// Creates an engine over a custom fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn QuotaFetcher>) -> Self {
        Self { fetcher }
    }

    /// Runs the full pipeline against `sources`.
    #[instrument(skip(self, sources))]
    pub async fn run(&self, sources: &QuotaSources, now: DateTime<Utc>) -> QuotaReport {
        let tokens = collect_tokens(sources, now);
        info!(
            tokens = tokens.len(),
            presets = sources.presets.len(),
            external = sources.external.len(),
            "Aggregating quota"
        );

        let fetched = fetch_all(Arc::clone(&self.fetcher), tokens, now).await;
        QuotaReport::build(fetched, now)
    }
}

impl Default for QuotaEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
