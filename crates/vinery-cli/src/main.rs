//! Command-line shell for the review worker.
//!
//! Wires the real adapters together (Sheets client, Chromium factory, stdin
//! bootstrap gate), spawns the worker, prints its status stream, and turns
//! Ctrl-C into a cooperative stop. All state-transition logic lives in
//! `vinery-worker`; this binary only assembles and observes it.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use vinery_browser::SessionProfile;
use vinery_core::{AppConfig, SpreadsheetId};
use vinery_sheets::SheetsClient;
use vinery_worker::{spawn_worker, ChromiumFactory, ManualGate, WorkerOptions};

#[derive(Parser, Debug)]
#[command(name = "vinery", version, about = "Review submission worker")]
struct Cli {
    /// Path to the service-account credentials JSON
    #[arg(long, value_name = "FILE")]
    credentials: Option<PathBuf>,

    /// Spreadsheet identifier (the opaque key from the sheet URL)
    #[arg(long = "sheet-id", value_name = "ID")]
    sheet_id: Option<String>,

    /// Seconds between reconciliation cycles
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,

    /// Persistent Chromium profile directory
    #[arg(long, value_name = "DIR")]
    profile_dir: Option<PathBuf>,

    /// Directory for per-lead screenshots
    #[arg(long, value_name = "DIR")]
    screenshots_dir: Option<PathBuf>,

    /// Portal landing page opened for the manual bootstrap
    #[arg(long, value_name = "URL")]
    portal_url: Option<String>,
}

/// Bootstrap gate backed by standard input: the operator presses Enter once
/// the portal session is ready.
struct StdinGate;

#[async_trait::async_trait]
impl ManualGate for StdinGate {
    async fn wait_for_confirmation(&self) {
        println!("Press Enter once the portal session is ready...");
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        let _ = reader.read_line(&mut line).await;
    }
}

/// Validate the configured poll delay. Must be finite and positive:
/// `Duration::from_secs_f64` panics on NaN or negative input.
fn poll_delay(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("poll delay must be a positive number of seconds, got {secs}");
    }
    Ok(Duration::from_secs_f64(secs))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Status lines go to stdout; tracing is for diagnostics behind RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_with_env().context("loading configuration")?;

    if let Some(delay) = cli.delay {
        config.general.poll_delay_secs = delay;
    }
    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(dir) = cli.profile_dir {
        config.browser.profile_dir = Some(dir);
    }
    if let Some(dir) = cli.screenshots_dir {
        config.general.screenshots_dir = dir;
    }
    if let Some(url) = cli.portal_url {
        config.browser.portal_url = url;
    }
    if let Some(path) = cli.credentials {
        config.sheets.credentials_path = Some(path);
    }
    if let Some(id) = cli.sheet_id {
        config.sheets.spreadsheet_id = Some(id);
    }

    let poll_delay = poll_delay(config.general.poll_delay_secs)?;

    let credentials = config
        .sheets
        .credentials_path
        .clone()
        .context("no credentials file: pass --credentials or set sheets.credentials_path")?;
    let sheet_id = config
        .sheets
        .spreadsheet_id
        .clone()
        .context("no spreadsheet ID: pass --sheet-id or set sheets.spreadsheet_id")?;
    let spreadsheet_id = SpreadsheetId::new(sheet_id)?;

    let store = SheetsClient::from_credentials_file(&credentials, spreadsheet_id)
        .with_context(|| format!("loading credentials from {}", credentials.display()))?;

    let profile = SessionProfile::new(config.profile_dir()?).headless(config.browser.headless);
    let factory = ChromiumFactory::new(profile);

    let options = WorkerOptions {
        poll_delay,
        portal_url: config.browser.portal_url.clone(),
        screenshots_dir: config.general.screenshots_dir.clone(),
    };

    let (handle, mut rx) = spawn_worker(store, factory, StdinGate, options);

    let interrupted = loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(line) => println!("{line}"),
                // Channel closed: the worker terminated on its own
                None => break false,
            },
            _ = tokio::signal::ctrl_c() => break true,
        }
    };

    if interrupted {
        println!("Stopping...");
        handle.stop().await;
        while let Some(line) = rx.recv().await {
            println!("{line}");
        }
    } else {
        handle.join().await;
        bail!("worker exited");
    }

    Ok(())
}
