// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # opm Store
//!
//! Preset storage, backups, and atomic switching for the managed
//! credential file.
//!
//! This crate provides:
//!
//! - **PresetManager**: One façade wiring config, presets, and backups
//! - **PresetStore** / **BackupStore**: On-disk JSON snapshot stores
//! - **Config**: Persisted settings (auth path, current preset, metadata)
//! - **Persistence**: Atomic JSON file I/O with restrictive permissions
//!
//! ## Usage
//!
//! ```ignore
//! use opm_store::{PresetManager, StorePaths};
//!
//! let paths = StorePaths::discover(None);
//! let mut manager = PresetManager::open(paths).await?;
//!
//! // Snapshot the active credential file.
//! manager.save_preset("work", "work account", None).await?;
//!
//! // Later, switch back to it (backing up the current state first).
//! let report = manager.switch("work", true).await?;
//! println!("{} services changed", report.diff.change_count());
//! ```

pub mod backups;
pub mod config;
pub mod error;
pub mod manager;
pub mod persistence;
pub mod presets;
pub mod switch;

pub use backups::BackupStore;
pub use config::{Config, StorePaths};
pub use error::StoreError;
pub use manager::PresetManager;
pub use persistence::{default_auth_path, default_config_dir, load_json, save_json};
pub use presets::{PresetStore, validate_name};
pub use switch::{SwitchError, SwitchPhase, SwitchReport};
