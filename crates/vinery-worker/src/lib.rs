//! Lead reconciliation loop.
//!
//! The only component with real state-transition logic: repeatedly pulls
//! lead rows from the store, drives the browser session to submit each
//! review, and relocates every row to "processed" or "not_processed" with
//! row-level error isolation. Runs indefinitely once started; terminates
//! only on fatal schema misconfiguration or cooperative cancellation.

pub mod error;
pub mod gate;
pub mod handle;
pub mod lead;
pub mod session;
pub mod status;
pub mod worker;

pub use error::{Result, RowFault, WorkerError};
pub use gate::{AutoGate, BootstrapSignal, ManualGate, NotifyGate};
pub use handle::{spawn_worker, WorkerHandle};
pub use lead::LeadRow;
pub use session::{ChromiumFactory, SessionFactory};
pub use status::StatusSender;
pub use worker::{Worker, WorkerOptions};
