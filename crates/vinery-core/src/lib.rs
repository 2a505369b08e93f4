//! Vinery Core - Foundation crate for the Vinery review processor.
//!
//! This crate provides shared types, error handling, and configuration
//! management that the other Vinery crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and helpers (`SpreadsheetId`, ASIN handling)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, GeneralConfig, SheetsConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{extract_asin, screenshot_stem, SpreadsheetId};
