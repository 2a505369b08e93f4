//! Error types for the reconciliation loop.
//!
//! Faults are scoped: [`RowFault`] never propagates past the row boundary
//! (the row is relocated to "not_processed" and iteration continues), while
//! [`WorkerError`] is cycle-level (logged, then the cycle is retried after
//! the poll delay).

use thiserror::Error;
use vinery_browser::BrowserError;
use vinery_sheets::SheetsError;

/// Cycle-level errors: the loop reports them and retries after the delay.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Remote store fault
    #[error("sheet error: {0}")]
    Sheets(#[from] SheetsError),

    /// Browser session fault
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// I/O fault (screenshot directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cycle-level operations.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// A row-scoped fault, rendered into the `ERROR` column of "not_processed".
#[derive(Debug, Clone)]
pub struct RowFault {
    message: String,
}

impl RowFault {
    /// Create a fault from a human-readable description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The description written to the `ERROR` column.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for RowFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<BrowserError> for RowFault {
    fn from(err: BrowserError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<SheetsError> for RowFault {
    fn from(err: SheetsError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for RowFault {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}
