//! The portal review form interaction sequence.

use crate::outcome::SubmitOutcome;
use vinery_browser::error::BrowserError;
use vinery_browser::pace::human_pause;
use vinery_browser::BrowserActions;

/// Selector for the five-star rating control.
pub const FIVE_STAR_SELECTOR: &str = "img[alt='select to rate item five star.']";

/// Selector for the review body text area.
pub const REVIEW_TEXT_SELECTOR: &str = "#reviewText";

/// Selector for the review headline input.
pub const HEADLINE_SELECTOR: &str = "#reviewTitle";

/// Selector for the form submit control.
pub const SUBMIT_SELECTOR: &str = "input[type=\"submit\"].a-button-input";

/// Bounded wait for each target element to become interactable.
pub const STEP_TIMEOUT_MS: u64 = 10_000;

/// Pause range between interaction steps, in seconds.
const STEP_PAUSE_SECS: (f64, f64) = (3.0, 6.0);

/// Fields submitted through the review form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewForm {
    /// Review body text
    pub review: String,
    /// Review headline
    pub headline: String,
}

/// Submit one review on an already-navigated page.
///
/// Selects the fixed five-star rating, fills the review text and headline,
/// and invokes the submit control, with randomized pauses between steps.
/// Any step failure abandons the form and yields `Failed`; the caller never
/// sees an `Err`.
pub async fn submit_review<B: BrowserActions + ?Sized>(
    browser: &B,
    form: &ReviewForm,
) -> SubmitOutcome {
    match run_sequence(browser, form).await {
        Ok(()) => SubmitOutcome::Submitted,
        Err(e) => {
            tracing::warn!("Review submission failed: {e}");
            SubmitOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

async fn run_sequence<B: BrowserActions + ?Sized>(
    browser: &B,
    form: &ReviewForm,
) -> Result<(), BrowserError> {
    browser
        .wait_for_selector(FIVE_STAR_SELECTOR, STEP_TIMEOUT_MS)
        .await?;
    browser.click(FIVE_STAR_SELECTOR).await?;
    human_pause(STEP_PAUSE_SECS.0, STEP_PAUSE_SECS.1).await;

    browser
        .wait_for_selector(REVIEW_TEXT_SELECTOR, STEP_TIMEOUT_MS)
        .await?;
    browser
        .fill_field(REVIEW_TEXT_SELECTOR, &form.review)
        .await?;
    human_pause(STEP_PAUSE_SECS.0, STEP_PAUSE_SECS.1).await;

    browser
        .wait_for_selector(HEADLINE_SELECTOR, STEP_TIMEOUT_MS)
        .await?;
    browser
        .fill_field(HEADLINE_SELECTOR, &form.headline)
        .await?;
    human_pause(STEP_PAUSE_SECS.0, STEP_PAUSE_SECS.1).await;

    browser
        .wait_for_selector(SUBMIT_SELECTOR, STEP_TIMEOUT_MS)
        .await?;
    browser.click(SUBMIT_SELECTOR).await?;
    human_pause(STEP_PAUSE_SECS.0, STEP_PAUSE_SECS.1).await;

    Ok(())
}
