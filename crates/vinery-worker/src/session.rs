//! Browser session establishment.
//!
//! The loop owns its session for the loop's lifetime but must be able to
//! re-establish it after cycle-level faults, so session creation is behind
//! a factory trait. Tests inject a fake.

use vinery_browser::{BrowserActions, BrowserEngine, BrowserError, SessionProfile};

/// Creates browser sessions for the reconciliation loop.
#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync {
    /// The session type produced by this factory.
    type Session: BrowserActions + Send + Sync;

    /// Establish a new session.
    async fn connect(&self) -> Result<Self::Session, BrowserError>;
}

/// Factory launching real Chromium sessions with a fixed profile.
pub struct ChromiumFactory {
    profile: SessionProfile,
}

impl ChromiumFactory {
    /// Create a factory for the given session profile.
    #[must_use]
    pub fn new(profile: SessionProfile) -> Self {
        Self { profile }
    }
}

#[async_trait::async_trait]
impl SessionFactory for ChromiumFactory {
    type Session = BrowserEngine;

    async fn connect(&self) -> Result<BrowserEngine, BrowserError> {
        BrowserEngine::launch(&self.profile).await
    }
}
