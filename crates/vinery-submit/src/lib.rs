//! Review submission against the portal review form.
//!
//! One fixed interaction sequence: select the five-star rating, populate the
//! review text and headline, submit. Any mid-sequence failure abandons the
//! form; there is no partial-submission recovery.

pub mod form;
pub mod outcome;

pub use form::{submit_review, ReviewForm, STEP_TIMEOUT_MS};
pub use outcome::SubmitOutcome;
