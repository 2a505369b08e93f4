//! One-time manual bootstrap gate.
//!
//! On the first browser session of a run the portal typically presents a
//! login/challenge page that only a human can clear. The worker opens the
//! landing page and blocks on this gate until the operator confirms.

use std::sync::Arc;
use tokio::sync::Notify;

/// Blocks the worker until the operator confirms the bootstrap step.
#[async_trait::async_trait]
pub trait ManualGate: Send + Sync {
    /// Wait for a single manual confirmation.
    async fn wait_for_confirmation(&self);
}

/// Gate that never blocks. Used in tests and for pre-authenticated
/// profiles where no manual step is needed.
pub struct AutoGate;

#[async_trait::async_trait]
impl ManualGate for AutoGate {
    async fn wait_for_confirmation(&self) {}
}

/// Gate released by a [`BootstrapSignal`] held by the shell.
pub struct NotifyGate {
    notify: Arc<Notify>,
}

impl NotifyGate {
    /// Create a gate and keep the paired signal for the shell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
        }
    }

    /// Obtain a signal handle that releases this gate.
    #[must_use]
    pub fn signal(&self) -> BootstrapSignal {
        BootstrapSignal {
            notify: self.notify.clone(),
        }
    }
}

impl Default for NotifyGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ManualGate for NotifyGate {
    async fn wait_for_confirmation(&self) {
        self.notify.notified().await;
    }
}

/// Shell-side handle that releases a [`NotifyGate`].
#[derive(Clone)]
pub struct BootstrapSignal {
    notify: Arc<Notify>,
}

impl BootstrapSignal {
    /// Confirm the manual bootstrap step.
    pub fn confirm(&self) {
        self.notify.notify_one();
    }
}
