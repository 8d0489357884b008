//! Domain models for opm.
//!
//! This module contains the core data structures for credential documents,
//! presets, tokens, and quota results.
//!
//! ## Submodules
//!
//! - [`document`] - Credential documents (AuthDocument, ServiceDiff)
//! - [`preset`] - Preset metadata (Preset, PresetMeta)
//! - [`token`] - Provider and token types (ProviderKind, TokenRecord, Origin)
//! - [`quota`] - Normalized quota data (QuotaRecord, QuotaWindow, QuotaStatus)

mod document;
mod preset;
mod quota;
mod token;

// Re-export everything at the models level
pub use document::{AuthDocument, ServiceDiff};
pub use preset::{Preset, PresetMeta};
pub use quota::{QuotaRecord, QuotaStatus, QuotaWindow};
pub use token::{Origin, ProviderKind, TokenRecord};
