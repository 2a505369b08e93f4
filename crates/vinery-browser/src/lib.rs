//! Browser automation engine for the review portal.
//!
//! Provides Chromium control with a persistent profile directory and
//! deliberately human-like pacing for portal interaction.

pub mod actions;
pub mod engine;
pub mod error;
pub mod pace;
pub mod profile;

pub use actions::BrowserActions;
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use profile::SessionProfile;
