//! Error types for the sheets adapter.

use thiserror::Error;

/// Errors that can occur in sheet operations.
#[derive(Error, Debug)]
pub enum SheetsError {
    /// Required table (worksheet) is missing from the spreadsheet
    #[error("required sheet not found: {name}")]
    MissingTable {
        /// Title of the missing sheet
        name: String,
    },

    /// The leads sheet exists but has no header row
    #[error("no headers found in leads sheet")]
    EmptyHeader,

    /// Service-account authentication failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Failed to read or parse the credentials file
    #[error("failed to load credentials from {path}: {reason}")]
    Credentials {
        /// Path to the credentials file
        path: String,
        /// Reason loading failed
        reason: String,
    },

    /// JWT assertion could not be signed
    #[error("failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Sheets API returned a non-success status
    #[error("Sheets API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API response
        message: String,
    },

    /// Response body could not be decoded
    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// I/O error (credentials file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sheet operations.
pub type Result<T> = std::result::Result<T, SheetsError>;
