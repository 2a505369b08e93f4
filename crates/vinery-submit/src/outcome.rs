//! Submission outcome types.

use serde::{Deserialize, Serialize};

/// Outcome of one review submission attempt.
///
/// Failures are terminal per lead; the reconciliation loop relocates the
/// lead rather than retrying.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form was submitted successfully
    Submitted,

    /// Submission failed with reason
    Failed {
        /// Human-readable failure reason
        reason: String,
    },
}

impl SubmitOutcome {
    /// Check if the outcome is successful
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// Check if the outcome is a failure
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
