// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # opm Quota
//!
//! The quota aggregation engine.
//!
//! Credential documents repeat themselves: the active file usually matches
//! one of the presets, presets share accounts, and the external Antigravity
//! list overlaps with the `"google"` entry. Fetching quota once per document
//! would hammer the endpoints with duplicate calls and rate-limit the very
//! tokens being inspected. This crate therefore runs a pipeline:
//!
//! 1. [`collect_tokens`] scans every source and deduplicates credentials by
//!    value, remembering each origin a credential appeared in,
//! 2. [`fetch_all`] fetches each unique token exactly once through a
//!    bounded concurrent pool, turning per-token failures into
//!    failure-status records instead of errors,
//! 3. [`QuotaReport::build`] fans the results back out to every origin.
//!
//! ## Usage
//!
//! ```ignore
//! use chrono::Utc;
//! use opm_quota::{QuotaEngine, QuotaSources};
//!
//! let sources = QuotaSources {
//!     active: manager.read_active()?,
//!     presets: manager.preset_documents()?,
//!     external: opm_providers::antigravity::load_external_accounts(),
//! };
//! let report = QuotaEngine::new().run(&sources, Utc::now()).await;
//! ```

pub mod collect;
pub mod engine;
pub mod fetch;
pub mod report;

// Re-exports
pub use collect::{collect_tokens, QuotaSources, UniqueToken};
pub use engine::QuotaEngine;
pub use fetch::{fetch_all, ProviderFetcher, QuotaFetcher, MAX_CONCURRENT_FETCHES};
pub use report::{QuotaEntry, QuotaReport};
