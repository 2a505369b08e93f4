//! Status channel from the worker to the control shell.
//!
//! One-directional, asynchronous, FIFO. The worker never blocks on it:
//! messages are queued unbounded and delivery to the shell is eventual.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Sends human-readable progress/error strings to the shell.
#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: UnboundedSender<String>,
}

impl StatusSender {
    /// Create a sender/receiver pair.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit one status line. Also logged through tracing; a closed receiver
    /// is ignored since the shell may have gone away first.
    pub fn emit(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        let _ = self.tx.send(message);
    }
}
