//! Google Sheets adapter for the Vinery lead tables.
//!
//! Presents the three logical tables ("leads", "processed", "not_processed")
//! as read/append/delete operations behind the [`TableStore`] trait, with
//! schema setup and repair in [`schema`]. The real backend is the Sheets v4
//! REST API with service-account auth; [`MemoryStore`] backs tests and dry
//! runs.

pub mod auth;
pub mod client;
pub mod error;
pub mod schema;
pub mod store;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::SheetsClient;
pub use error::{Result, SheetsError};
pub use schema::{derive_failed_header, ensure_schema, TableSet};
pub use store::{MemoryStore, TableStore, ERROR_COLUMN, LEADS, NOT_PROCESSED, PROCESSED};
