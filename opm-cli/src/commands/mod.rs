//! CLI command implementations.

pub mod config;
pub mod delete;
pub mod info;
pub mod list;
pub mod quota;
pub mod save;
pub mod status;
pub mod switch;
