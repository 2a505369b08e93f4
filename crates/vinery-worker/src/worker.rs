//! The reconciliation loop driver.

use crate::error::{Result, RowFault};
use crate::gate::ManualGate;
use crate::lead::{LeadRow, ASIN_COLUMN, REVIEWED_STATUS, REVIEW_LINK_COLUMN, STATUS_COLUMN};
use crate::session::SessionFactory;
use crate::status::StatusSender;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vinery_browser::pace::{human_pause, scaled_duration};
use vinery_browser::BrowserActions;
use vinery_core::screenshot_stem;
use vinery_sheets::{ensure_schema, TableStore, LEADS, NOT_PROCESSED, PROCESSED};
use vinery_submit::{submit_review, SubmitOutcome};

/// Settle pause after navigating to a review link, in seconds.
const SETTLE_PAUSE_SECS: (f64, f64) = (2.0, 4.0);

/// Inter-row pacing bounds as multiples of the poll delay.
const ROW_PACE_RANGE: (f64, f64) = (0.7, 1.4);

/// Runtime options for one worker.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Delay between reconciliation cycles; also the base for inter-row
    /// pacing after successful submissions
    pub poll_delay: Duration,
    /// Landing page opened once for the manual bootstrap
    pub portal_url: String,
    /// Directory receiving one PNG per successfully processed lead
    pub screenshots_dir: PathBuf,
}

/// How one cycle ended.
enum Cycle {
    /// Rows were examined; poll again after the delay
    Worked,
    /// Nothing to do; poll again after the delay
    Idle,
    /// Cooperative stop requested
    Stopped,
    /// Schema contract violated; the loop must terminate
    Fatal,
}

/// The lead reconciliation worker.
///
/// Sole mutator of the three lead tables. The browser session is
/// established lazily, reused across cycles, and dropped after cycle-level
/// faults so the next cycle reconnects. `bootstrapped` is per-worker state:
/// multiple workers (e.g. under test) never interfere.
pub struct Worker<S, F, G>
where
    S: TableStore,
    F: SessionFactory,
    G: ManualGate,
{
    store: S,
    factory: F,
    gate: G,
    options: WorkerOptions,
    status: StatusSender,
    cancel: CancellationToken,
    bootstrapped: bool,
    session: Option<F::Session>,
}

impl<S, F, G> Worker<S, F, G>
where
    S: TableStore,
    F: SessionFactory,
    G: ManualGate,
{
    /// Create a worker. It does nothing until [`run`](Self::run) is awaited.
    pub fn new(
        store: S,
        factory: F,
        gate: G,
        options: WorkerOptions,
        status: StatusSender,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            factory,
            gate,
            options,
            status,
            cancel,
            bootstrapped: false,
            session: None,
        }
    }

    /// Run the loop until a fatal setup fault or cancellation.
    ///
    /// Cycle-level faults are reported to the status channel and retried
    /// after the poll delay; the loop itself never panics the task.
    pub async fn run(mut self) {
        if let Err(e) = tokio::fs::create_dir_all(&self.options.screenshots_dir).await {
            self.status
                .emit(format!("Failed to create screenshots directory: {e}"));
            return;
        }

        if let Err(e) = ensure_schema(&self.store).await {
            self.status.emit(format!("Error setting up sheets: {e}"));
            self.status
                .emit("Failed to set up one or more required sheets. Exiting.");
            return;
        }

        loop {
            if self.cancel.is_cancelled() {
                self.status.emit("Worker stopped.");
                return;
            }

            match self.run_cycle().await {
                Ok(Cycle::Worked | Cycle::Idle) => {}
                Ok(Cycle::Stopped) => {
                    self.status.emit("Worker stopped.");
                    return;
                }
                Ok(Cycle::Fatal) => return,
                Err(e) => {
                    // Session (if any) was dropped with the failed cycle;
                    // the next cycle re-establishes it.
                    self.status.emit(format!("Main process error: {e}"));
                }
            }

            if self.pause(self.options.poll_delay).await {
                self.status.emit("Worker stopped.");
                return;
            }
        }
    }

    /// One poll-process-relocate cycle over the current leads snapshot.
    async fn run_cycle(&mut self) -> Result<Cycle> {
        let all_values = self.store.read_all(LEADS).await?;
        if all_values.is_empty() {
            self.status.emit("Empty sheet. Waiting...");
            return Ok(Cycle::Idle);
        }

        let header: Vec<String> = all_values[0].iter().map(|h| h.trim().to_string()).collect();

        if all_values.len() <= 1 {
            self.status.emit("No new leads to process. Waiting...");
            return Ok(Cycle::Idle);
        }

        let Some(link_idx) = header.iter().position(|h| h == REVIEW_LINK_COLUMN) else {
            self.status.emit("Review link column not found in headers!");
            return Ok(Cycle::Fatal);
        };

        let cancel = self.cancel.clone();
        let session = tokio::select! {
            result = self.obtain_session() => result?,
            () = cancel.cancelled() => return Ok(Cycle::Stopped),
        };

        // Descending traversal: deleting a row never shifts the indices of
        // rows not yet visited.
        for row_idx in (1..all_values.len()).rev() {
            if self.cancel.is_cancelled() {
                self.session = Some(session);
                return Ok(Cycle::Stopped);
            }

            let values = &all_values[row_idx];
            let blank = values
                .get(link_idx)
                .map_or(true, |v| v.trim().is_empty());
            if blank {
                tracing::debug!("No review link for row {}", row_idx + 1);
                continue;
            }

            let mut lead = LeadRow::from_values(&header, (row_idx + 1) as u32, values.clone());
            self.status.emit(format!("Processing lead {row_idx}"));

            let result = match self.attempt(&session, &mut lead).await {
                Ok(screenshot) => self.relocate_processed(&header, &lead, &screenshot).await,
                Err(fault) => Err(fault),
            };

            match result {
                Ok(()) => {
                    self.status
                        .emit(format!("Successfully processed lead {row_idx}"));
                    let pace = scaled_duration(
                        self.options.poll_delay,
                        ROW_PACE_RANGE.0,
                        ROW_PACE_RANGE.1,
                    );
                    if self.pause(pace).await {
                        self.session = Some(session);
                        return Ok(Cycle::Stopped);
                    }
                }
                Err(fault) => {
                    self.status
                        .emit(format!("Error processing lead {row_idx}: {fault}"));
                    // A failure here is a store fault, not a row fault:
                    // propagate to the cycle level.
                    self.relocate_failed(&header, &lead, fault.message()).await?;
                }
            }
        }

        self.session = Some(session);
        Ok(Cycle::Worked)
    }

    /// Reuse the held session or establish a new one. The one-time manual
    /// bootstrap runs on the first session of this worker's lifetime only.
    async fn obtain_session(&mut self) -> Result<F::Session> {
        if let Some(session) = self.session.take() {
            return Ok(session);
        }

        self.status.emit("Opening browser session...");
        let session = self.factory.connect().await?;

        if !self.bootstrapped {
            session.navigate(&self.options.portal_url).await?;
            self.status
                .emit("Confirm portal login in the browser, then continue...");
            self.gate.wait_for_confirmation().await;
            self.bootstrapped = true;
        }

        Ok(session)
    }

    /// Drive one lead through navigation and submission. Returns the result
    /// screenshot on success; all side effects on the store belong to the
    /// caller.
    async fn attempt(
        &self,
        session: &F::Session,
        lead: &mut LeadRow,
    ) -> std::result::Result<Vec<u8>, RowFault> {
        let website = lead
            .review_link()
            .ok_or_else(|| RowFault::new("missing review link"))?
            .to_string();
        self.status.emit(format!("Opening website: {website}"));

        if let Some(asin) = lead.ensure_asin() {
            self.status.emit(format!("Extracted ASIN: {asin}"));
        }

        session.navigate(&website).await?;
        human_pause(SETTLE_PAUSE_SECS.0, SETTLE_PAUSE_SECS.1).await;

        let form = lead.review_form()?;
        match submit_review(session, &form).await {
            SubmitOutcome::Submitted => {}
            SubmitOutcome::Failed { reason } => {
                return Err(RowFault::new(format!("Failed to upload review: {reason}")));
            }
        }

        lead.set(STATUS_COLUMN, REVIEWED_STATUS);
        Ok(session.screenshot().await?)
    }

    /// Relocate a reviewed lead: screenshot to disk, append to "processed",
    /// delete from "leads". Delete is the authoritative completion signal.
    async fn relocate_processed(
        &self,
        header: &[String],
        lead: &LeadRow,
        screenshot: &[u8],
    ) -> std::result::Result<(), RowFault> {
        let stem = screenshot_stem(lead.get(ASIN_COLUMN));
        let path = self.options.screenshots_dir.join(format!("{stem}.png"));
        tokio::fs::write(&path, screenshot).await?;

        self.store
            .append_row(PROCESSED, &lead.cleaned_row(header))
            .await?;
        self.store.delete_row(LEADS, lead.row_number).await?;
        Ok(())
    }

    /// Relocate a failed lead: original values plus the fault description
    /// to "not_processed", delete from "leads".
    async fn relocate_failed(&self, header: &[String], lead: &LeadRow, error: &str) -> Result<()> {
        self.store
            .append_row(NOT_PROCESSED, &lead.failed_row(header, error))
            .await?;
        self.store.delete_row(LEADS, lead.row_number).await?;
        Ok(())
    }

    /// Cancellable sleep; true means stop was requested.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => true,
            () = tokio::time::sleep(duration) => false,
        }
    }
}
