use crate::error::{BrowserError, Result};

/// Browser actions for automation.
///
/// The reconciliation loop and the submission capability depend on this
/// trait rather than on a concrete engine, so both can be tested against a
/// fake implementation.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Click an element by selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Fill a form field by selector (click, then type)
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Wait for a selector to appear
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()>;

    /// Take a PNG screenshot of the current page
    async fn screenshot(&self) -> Result<Vec<u8>>;
}

/// Helper to validate a URL before navigation.
pub fn parse_url(url: &str) -> Result<url::Url> {
    url::Url::parse(url).map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {e}")))
}
