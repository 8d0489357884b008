// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # opm Providers
//!
//! Provider-specific credential extraction and quota API clients.
//!
//! Each provider module knows two things about its service:
//!
//! - how OpenCode stores the service's OAuth entry inside the credential
//!   document, exposed as an `extract_token` function that lifts the raw
//!   JSON into an [`opm_core::TokenRecord`], and
//! - how to turn that token into normalized [`opm_core::QuotaRecord`]s by
//!   calling the service's usage endpoint.
//!
//! Supported providers:
//!
//! | Module | Service keys | Endpoint |
//! |--------|--------------|----------|
//! | [`openai`] | `codex`, `openai` | ChatGPT backend usage API |
//! | [`antigravity`] | `google` | Cloud Code model quota API |
//!
//! The clients never mutate stored credentials. Refreshed Antigravity
//! access tokens live only for the duration of the fetch.

pub mod antigravity;
pub mod openai;
