use crate::actions::{parse_url, BrowserActions};
use crate::error::{BrowserError, Result};
use crate::profile::SessionProfile;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, Headers, SetExtraHttpHeadersParams,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Poll interval while waiting for a selector to appear.
const SELECTOR_POLL_MS: u64 = 250;

/// Browser automation engine.
///
/// Owns one Chromium process, one page, and the spawned CDP event handler
/// task. The profile directory given at launch persists portal login state
/// between sessions.
pub struct BrowserEngine {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch Chromium with the given session profile.
    pub async fn launch(profile: &SessionProfile) -> Result<Self> {
        std::fs::create_dir_all(&profile.user_data_dir)
            .map_err(|e| BrowserError::ChromiumError(format!("profile dir: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&profile.user_data_dir)
            .window_size(profile.window.0, profile.window.1)
            .args(profile.chrome_args());

        if !profile.headless {
            builder = builder.with_head();
        }

        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Drive CDP events for the lifetime of the engine
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        if profile.do_not_track {
            page.execute(EnableParams::default())
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
            page.execute(SetExtraHttpHeadersParams::new(Headers::new(
                serde_json::json!({ "DNT": "1" }),
            )))
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        }

        tracing::debug!(
            "Launched Chromium session (headless={}, profile={})",
            profile.headless,
            profile.user_data_dir.display()
        );

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Close the browser and stop the event handler.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {e}");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str) -> Result<()> {
        parse_url(url)?;
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        element
            .type_str(value)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "{selector} after {timeout_ms}ms"
                )));
            }
            tokio::time::sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
        }
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| BrowserError::ScreenshotError(e.to_string()))
    }
}
