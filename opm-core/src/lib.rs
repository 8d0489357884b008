// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # opm Core
//!
//! Core types and models shared across the opm crates.
//!
//! This crate provides the foundational abstractions for the preset
//! storage/switch engine and the quota aggregation engine:
//!
//! - Credential documents ([`AuthDocument`]) and service-level diffs
//!   ([`ServiceDiff`])
//! - Preset metadata ([`Preset`], [`PresetMeta`])
//! - Provider and token types ([`ProviderKind`], [`TokenRecord`], [`Origin`])
//! - Normalized quota data ([`QuotaRecord`], [`QuotaWindow`], [`QuotaStatus`])
//! - Epoch timestamp and reset-countdown helpers ([`timestamp`])

pub mod models;
pub mod timestamp;

// Re-export all model types
pub use models::{
    // Credential documents
    AuthDocument,
    ServiceDiff,
    // Preset metadata
    Preset,
    PresetMeta,
    // Providers and tokens
    Origin,
    ProviderKind,
    TokenRecord,
    // Quota data
    QuotaRecord,
    QuotaStatus,
    QuotaWindow,
};

// Re-export timestamp helpers
pub use timestamp::{countdown, from_epoch_auto};
