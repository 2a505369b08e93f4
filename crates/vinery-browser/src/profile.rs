use std::path::PathBuf;

/// Session configuration for a portal browser.
///
/// The profile directory is persistent so the portal login survives across
/// sessions; it is owned exclusively by the worker for the loop's lifetime.
#[derive(Debug, Clone)]
pub struct SessionProfile {
    /// Run without a visible window
    pub headless: bool,
    /// Persistent Chromium profile directory
    pub user_data_dir: PathBuf,
    /// Browser locale
    pub locale: String,
    /// Send the DNT request header
    pub do_not_track: bool,
    /// Window size (width, height)
    pub window: (u32, u32),
}

impl SessionProfile {
    /// Create a profile with portal defaults: visible window, English
    /// locale, tracking disabled.
    #[must_use]
    pub fn new(user_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            headless: false,
            user_data_dir: user_data_dir.into(),
            locale: "en-US".to_string(),
            do_not_track: true,
            window: (1280, 900),
        }
    }

    /// Set headless mode.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Extra Chromium launch arguments derived from the profile.
    #[must_use]
    pub fn chrome_args(&self) -> Vec<String> {
        vec![format!("--lang={}", self.locale)]
    }
}
