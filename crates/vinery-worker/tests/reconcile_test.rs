//! End-to-end reconciliation loop tests against an in-memory store and a
//! fake browser. Paused-clock tests: every randomized pause elapses
//! instantly, so full cycles run deterministically.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vinery_browser::{BrowserActions, BrowserError};
use vinery_sheets::{MemoryStore, SheetsError, TableStore, LEADS, NOT_PROCESSED, PROCESSED};
use vinery_worker::{spawn_worker, AutoGate, SessionFactory, WorkerHandle, WorkerOptions};

/// Marker query parameter that makes the fake portal reject the submission.
const FAIL_MARKER: &str = "fail=1";

#[derive(Default)]
struct BrowserState {
    current_url: String,
    visited: Vec<String>,
}

/// Fake portal: every interaction succeeds unless the current page URL
/// carries the failure marker, in which case selectors never resolve.
#[derive(Clone, Default)]
struct FakeBrowser {
    state: Arc<Mutex<BrowserState>>,
}

impl FakeBrowser {
    fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    fn failing(&self) -> bool {
        self.state.lock().unwrap().current_url.contains(FAIL_MARKER)
    }
}

#[async_trait::async_trait]
impl BrowserActions for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.current_url = url.to_string();
        state.visited.push(url.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        if self.failing() {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        Ok(())
    }

    async fn fill_field(&self, selector: &str, _value: &str) -> Result<(), BrowserError> {
        if self.failing() {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout_ms: u64) -> Result<(), BrowserError> {
        if self.failing() {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, BrowserError> {
        Ok(b"fake-png".to_vec())
    }
}

struct FakeFactory {
    browser: FakeBrowser,
    connects: Arc<AtomicUsize>,
}

impl FakeFactory {
    fn new(browser: FakeBrowser) -> Self {
        Self {
            browser,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeBrowser;

    async fn connect(&self) -> Result<FakeBrowser, BrowserError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.browser.clone())
    }
}

/// Store wrapper injecting faults: fails the next `fail_reads` calls to
/// `read_all`, and every append to the `fail_append_to` table.
struct FaultyStore {
    inner: Arc<MemoryStore>,
    fail_reads: AtomicUsize,
    fail_append_to: Option<&'static str>,
}

impl FaultyStore {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_reads: AtomicUsize::new(0),
            fail_append_to: None,
        }
    }

    fn fail_appends_to(mut self, table: &'static str) -> Self {
        self.fail_append_to = Some(table);
        self
    }

    fn unavailable(what: &str) -> SheetsError {
        SheetsError::Api {
            status: 503,
            message: format!("{what} temporarily unavailable"),
        }
    }
}

#[async_trait::async_trait]
impl TableStore for FaultyStore {
    async fn table_exists(&self, table: &str) -> Result<bool, SheetsError> {
        self.inner.table_exists(table).await
    }

    async fn read_all(&self, table: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        if self.fail_reads.load(Ordering::SeqCst) > 0 {
            self.fail_reads.fetch_sub(1, Ordering::SeqCst);
            return Err(Self::unavailable("read"));
        }
        self.inner.read_all(table).await
    }

    async fn append_row(&self, table: &str, row: &[String]) -> Result<(), SheetsError> {
        if self.fail_append_to == Some(table) {
            return Err(Self::unavailable("append"));
        }
        self.inner.append_row(table, row).await
    }

    async fn delete_row(&self, table: &str, row_number: u32) -> Result<(), SheetsError> {
        self.inner.delete_row(table, row_number).await
    }

    async fn create_table(&self, table: &str, header: &[String]) -> Result<(), SheetsError> {
        self.inner.create_table(table, header).await
    }

    async fn reset_table(&self, table: &str, header: &[String]) -> Result<(), SheetsError> {
        self.inner.reset_table(table, header).await
    }
}

fn row(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn leads_header() -> Vec<String> {
    row(&["Review link", "Asin", "Review", "Headline", "Status"])
}

fn leads_store(data_rows: Vec<Vec<String>>) -> Arc<MemoryStore> {
    let mut rows = vec![leads_header()];
    rows.extend(data_rows);
    Arc::new(MemoryStore::with_table(LEADS, rows))
}

fn options(screenshots_dir: &Path) -> WorkerOptions {
    WorkerOptions {
        poll_delay: Duration::from_secs(60),
        portal_url: "https://portal.test/landing".to_string(),
        screenshots_dir: screenshots_dir.to_path_buf(),
    }
}

fn start(
    store: Arc<MemoryStore>,
    screenshots_dir: &Path,
) -> (
    WorkerHandle,
    tokio::sync::mpsc::UnboundedReceiver<String>,
    FakeBrowser,
) {
    let browser = FakeBrowser::default();
    let factory = FakeFactory::new(browser.clone());
    let (handle, rx) = spawn_worker(store, factory, AutoGate, options(screenshots_dir));
    (handle, rx, browser)
}

/// Poll a condition under the paused clock until it holds.
async fn wait_until<F: Fn() -> bool>(cond: F) {
    tokio::time::timeout(Duration::from_secs(3600), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn drain_until(rx: &mut tokio::sync::mpsc::UnboundedReceiver<String>, needle: &str) -> Vec<String> {
    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(3600), async {
        loop {
            let message = rx.recv().await.expect("status channel closed early");
            let done = message.contains(needle);
            seen.push(message);
            if done {
                return;
            }
        }
    })
    .await
    .expect("status not observed in time");
    seen
}

#[tokio::test(start_paused = true)]
async fn test_successful_lead_moves_to_processed() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![row(&[
        "https://portal.test/review?asin=B0TESTASIN1",
        "",
        "Solid build quality",
        "Does what it says",
        "",
    ])]);

    let (handle, _rx, _browser) = start(store.clone(), dir.path());

    wait_until(|| store.snapshot(LEADS).map_or(false, |rows| rows.len() == 1)).await;
    handle.stop().await;

    let processed = store.snapshot(PROCESSED).unwrap();
    assert_eq!(processed.len(), 2);
    assert_eq!(processed[1][0], "https://portal.test/review?asin=B0TESTASIN1");
    assert_eq!(processed[1][1], "B0TESTASIN1", "ASIN extracted from the URL");
    assert_eq!(processed[1][4], "Reviewed");

    let not_processed = store.snapshot(NOT_PROCESSED).unwrap();
    assert_eq!(not_processed.len(), 1, "no failure rows expected");

    let screenshot = dir.path().join("B0TESTASIN1.png");
    assert!(screenshot.exists(), "screenshot named after the ASIN");
    assert_eq!(std::fs::read(&screenshot).unwrap(), b"fake-png");
}

#[tokio::test(start_paused = true)]
async fn test_failed_lead_moves_to_not_processed_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![row(&[
        "https://portal.test/review?fail=1&asin=B0FAILASIN1",
        "B0FAILASIN1",
        " padded review ",
        "Headline",
        "",
    ])]);

    let (handle, _rx, _browser) = start(store.clone(), dir.path());

    wait_until(|| store.snapshot(LEADS).map_or(false, |rows| rows.len() == 1)).await;
    handle.stop().await;

    let not_processed = store.snapshot(NOT_PROCESSED).unwrap();
    assert_eq!(not_processed.len(), 2);
    let failed = &not_processed[1];
    assert_eq!(failed.len(), leads_header().len() + 1, "trailing error cell");
    let error = failed.last().unwrap();
    assert!(
        error.contains("Failed to upload review"),
        "unexpected error cell: {error}"
    );
    // Failure rows keep the original values untrimmed
    assert_eq!(failed[2], " padded review ");

    assert_eq!(store.snapshot(PROCESSED).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_blank_review_link_row_is_left_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![row(&["   ", "B0BLANK0001", "Review", "Headline", ""])]);

    let (handle, _rx, _browser) = start(store.clone(), dir.path());

    // Several poll cycles pass without the row being touched
    tokio::time::sleep(Duration::from_secs(600)).await;
    handle.stop().await;

    assert_eq!(store.snapshot(LEADS).unwrap().len(), 2);
    assert_eq!(store.snapshot(PROCESSED).unwrap().len(), 1);
    assert_eq!(store.snapshot(NOT_PROCESSED).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rows_are_processed_bottom_up() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![
        row(&["https://portal.test/review?asin=B0ROW000001", "", "r1", "h1", ""]),
        row(&["https://portal.test/review?asin=B0ROW000002", "", "r2", "h2", ""]),
        row(&["https://portal.test/review?asin=B0ROW000003", "", "r3", "h3", ""]),
    ]);

    let (handle, _rx, _browser) = start(store.clone(), dir.path());

    wait_until(|| store.snapshot(LEADS).map_or(false, |rows| rows.len() == 1)).await;
    handle.stop().await;

    let processed = store.snapshot(PROCESSED).unwrap();
    assert_eq!(processed.len(), 4, "every lead relocated exactly once");
    // Bottom-up traversal appends the last sheet row first
    let asins: Vec<&str> = processed[1..].iter().map(|r| r[1].as_str()).collect();
    assert_eq!(asins, vec!["B0ROW000003", "B0ROW000002", "B0ROW000001"]);
}

#[tokio::test(start_paused = true)]
async fn test_header_only_sheet_reports_no_new_leads() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![]);

    let (handle, mut rx, _browser) = start(store.clone(), dir.path());

    drain_until(&mut rx, "No new leads to process").await;
    handle.stop().await;

    assert_eq!(store.snapshot(LEADS).unwrap().len(), 1);
    assert_eq!(store.snapshot(PROCESSED).unwrap().len(), 1);
    assert_eq!(store.snapshot(NOT_PROCESSED).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_review_link_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::with_table(
        LEADS,
        vec![row(&["Asin", "Review", "Headline"]), row(&["B0X", "r", "h"])],
    ));

    let (handle, mut rx, _browser) = start(store.clone(), dir.path());

    let seen = drain_until(&mut rx, "Review link column not found").await;
    assert!(seen.iter().any(|m| m.contains("Review link column")));

    // The worker terminates on its own
    tokio::time::timeout(Duration::from_secs(3600), handle.join())
        .await
        .expect("worker did not exit after fatal header fault");

    assert_eq!(store.snapshot(LEADS).unwrap().len(), 2, "no rows touched");
}

#[tokio::test(start_paused = true)]
async fn test_schema_setup_failure_exits() {
    let dir = tempfile::tempdir().unwrap();
    // No leads table at all: schema setup cannot proceed
    let store = Arc::new(MemoryStore::new());

    let (handle, mut rx, _browser) = start(store.clone(), dir.path());

    let seen = drain_until(&mut rx, "Failed to set up one or more required sheets").await;
    assert!(seen.iter().any(|m| m.contains("Error setting up sheets")));

    tokio::time::timeout(Duration::from_secs(3600), handle.join())
        .await
        .expect("worker did not exit after setup failure");
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_navigates_portal_before_first_lead() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![row(&[
        "https://portal.test/review?asin=B0BOOT00001",
        "",
        "r",
        "h",
        "",
    ])]);

    let browser = FakeBrowser::default();
    let factory = FakeFactory::new(browser.clone());
    let connects = factory.connects.clone();
    let (handle, _rx) = spawn_worker(store.clone(), factory, AutoGate, options(dir.path()));

    wait_until(|| store.snapshot(LEADS).map_or(false, |rows| rows.len() == 1)).await;

    // Let a few idle cycles pass: the session is reused, not relaunched
    tokio::time::sleep(Duration::from_secs(600)).await;
    handle.stop().await;

    let visited = browser.visited();
    assert_eq!(visited[0], "https://portal.test/landing");
    assert_eq!(visited[1], "https://portal.test/review?asin=B0BOOT00001");
    assert_eq!(connects.load(Ordering::SeqCst), 1, "one session for the run");
}

#[tokio::test(start_paused = true)]
async fn test_transient_read_fault_is_retried_next_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![]);
    let faulty = Arc::new(FaultyStore::new(store.clone()));

    let browser = FakeBrowser::default();
    let factory = FakeFactory::new(browser.clone());
    let (handle, mut rx) = spawn_worker(faulty.clone(), factory, AutoGate, options(dir.path()));

    drain_until(&mut rx, "No new leads to process").await;

    // The next poll fails; the one after succeeds and finds the new lead
    faulty.fail_reads.store(1, Ordering::SeqCst);
    store
        .append_row(
            LEADS,
            &row(&["https://portal.test/review?asin=B0RETRY0001", "", "r", "h", ""]),
        )
        .await
        .unwrap();

    drain_until(&mut rx, "Main process error").await;

    wait_until(|| store.snapshot(LEADS).map_or(false, |rows| rows.len() == 1)).await;
    handle.stop().await;

    let processed = store.snapshot(PROCESSED).unwrap();
    assert_eq!(processed.len(), 2);
    assert_eq!(processed[1][1], "B0RETRY0001");
}

#[tokio::test(start_paused = true)]
async fn test_processed_append_fault_demotes_row_to_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![
        row(&["https://portal.test/review?asin=B0DEMOTE001", "", "r1", "h1", ""]),
        row(&["https://portal.test/review?asin=B0DEMOTE002", "", "r2", "h2", ""]),
    ]);
    let faulty = FaultyStore::new(store.clone()).fail_appends_to(PROCESSED);

    let browser = FakeBrowser::default();
    let factory = FakeFactory::new(browser.clone());
    let (handle, _rx) = spawn_worker(faulty, factory, AutoGate, options(dir.path()));

    wait_until(|| store.snapshot(LEADS).map_or(false, |rows| rows.len() == 1)).await;
    handle.stop().await;

    // Both submissions succeeded, but the success-path relocation failed:
    // each row is demoted to the failure table and the cycle carries on
    let not_processed = store.snapshot(NOT_PROCESSED).unwrap();
    assert_eq!(not_processed.len(), 3);
    for failed in &not_processed[1..] {
        assert_eq!(failed.len(), leads_header().len() + 1);
        assert!(failed.last().unwrap().contains("temporarily unavailable"));
    }
    assert_eq!(store.snapshot(PROCESSED).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_wakes_idle_worker() {
    let dir = tempfile::tempdir().unwrap();
    let store = leads_store(vec![]);

    let (handle, mut rx, _browser) = start(store, dir.path());
    drain_until(&mut rx, "No new leads to process").await;

    tokio::time::timeout(Duration::from_secs(3600), handle.stop())
        .await
        .expect("stop did not complete");
}
