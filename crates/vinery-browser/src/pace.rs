//! Human-like pacing between browser interactions.
//!
//! The portal is adversarial to fast scripted input, so randomized pauses
//! between steps are a behavioral requirement of the submission flow, not
//! an optimization.

use rand::Rng;
use std::time::Duration;

/// Sleep for a uniformly random duration in `[min_secs, max_secs]`.
pub async fn human_pause(min_secs: f64, max_secs: f64) {
    let duration = uniform_duration(min_secs, max_secs);
    tokio::time::sleep(duration).await;
}

/// A uniformly random duration in `[min_secs, max_secs]`.
#[must_use]
pub fn uniform_duration(min_secs: f64, max_secs: f64) -> Duration {
    let secs = rand::thread_rng().gen_range(min_secs..=max_secs);
    Duration::from_secs_f64(secs)
}

/// A randomized interval scaled around a base delay, e.g. 0.7x-1.4x the
/// configured poll delay between successfully processed rows.
#[must_use]
pub fn scaled_duration(base: Duration, low: f64, high: f64) -> Duration {
    let secs = base.as_secs_f64();
    uniform_duration(secs * low, secs * high)
}
