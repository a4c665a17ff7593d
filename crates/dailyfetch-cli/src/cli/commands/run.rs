//! `dailyfetch run`: one batch over every configured source.

use anyhow::Result;
use chrono::Utc;
use dailyfetch_core::api::{RequestExecutor, YouTubeClient};
use dailyfetch_core::config::{Credentials, FetchConfig};
use dailyfetch_core::discovery::{DiscoveryOptions, ThresholdWindow};
use dailyfetch_core::fetch::YtDlp;
use dailyfetch_core::ledger::{RunId, RunLedger};
use dailyfetch_core::scheduler::{BatchDriver, BatchOptions, BatchResult, StopReason};
use dailyfetch_core::sources::load_sources;
use std::path::PathBuf;

/// Flags that take precedence over config.toml for this invocation.
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub channels: Option<PathBuf>,
    pub playlists: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub window_hours: Option<u32>,
    pub early_exit: bool,
}

impl RunOverrides {
    pub fn apply(self, mut cfg: FetchConfig) -> FetchConfig {
        if let Some(p) = self.channels {
            cfg.channels_file = p;
        }
        if let Some(p) = self.playlists {
            cfg.playlists_file = p;
        }
        if let Some(d) = self.data_dir {
            cfg.data_dir = d;
        }
        if let Some(n) = self.workers {
            cfg.workers = n.max(1);
        }
        if let Some(h) = self.window_hours {
            cfg.window_hours = h;
        }
        cfg.early_exit |= self.early_exit;
        cfg
    }
}

pub async fn run_batch(cfg: FetchConfig, dry_run: bool) -> Result<()> {
    let credentials = Credentials::from_env()?;
    tracing::debug!("credentials: {:?}", credentials);

    let sources = load_sources(&cfg.channels_file, &cfg.playlists_file)?;
    if sources.is_empty() {
        println!(
            "No sources in {} or {}.",
            cfg.channels_file.display(),
            cfg.playlists_file.display()
        );
        return Ok(());
    }

    let window = ThresholdWindow::new(Utc::now(), cfg.window());
    let executor = RequestExecutor::new(
        YouTubeClient::new(&cfg.api_base_url, &credentials.api_key),
        cfg.retry_policy(),
    );
    let fetcher = YtDlp::new(
        cfg.yt_dlp_path.clone(),
        cfg.download_prefs(),
        credentials.cookies.clone(),
    );
    let driver = BatchDriver::new(
        executor,
        fetcher,
        BatchOptions {
            data_dir: cfg.data_dir.clone(),
            workers: cfg.workers,
            window,
            discovery: DiscoveryOptions {
                page_size: cfg.page_size,
                early_exit: cfg.early_exit,
            },
            dry_run,
        },
    );

    println!(
        "Checking {} source(s) for videos published since {}.",
        sources.len(),
        window.cutoff().format("%Y-%m-%d %H:%M UTC")
    );

    let ledger = open_ledger(dry_run).await;
    let run_id = match &ledger {
        Some(l) => l
            .begin_run(window.cutoff(), sources.len())
            .await
            .map_err(|e| tracing::warn!("run ledger: begin failed: {:#}", e))
            .ok(),
        None => None,
    };

    let result = match driver.run(&sources).await {
        Ok(result) => result,
        Err(err) => {
            if let (Some(l), Some(id)) = (&ledger, run_id) {
                if let Err(e) = l.abort_run(id, &format!("{:#}", err)).await {
                    tracing::warn!("run ledger: abort failed: {:#}", e);
                }
            }
            return Err(err);
        }
    };

    if let (Some(l), Some(id)) = (&ledger, run_id) {
        record_result(l, id, &result).await;
    }
    print_result(&result, dry_run);
    Ok(())
}

/// Dry runs leave no ledger trace. A ledger that cannot be opened never blocks downloads.
async fn open_ledger(dry_run: bool) -> Option<RunLedger> {
    if dry_run {
        return None;
    }
    match RunLedger::open_default().await {
        Ok(l) => Some(l),
        Err(e) => {
            tracing::warn!("run ledger unavailable: {:#}", e);
            None
        }
    }
}

async fn record_result(ledger: &RunLedger, id: RunId, result: &BatchResult) {
    for report in &result.reports {
        if let Err(e) = ledger.record_fetches(id, report).await {
            tracing::warn!(source = %report.label, "run ledger: recording fetches failed: {:#}", e);
        }
    }
    if let Err(e) = ledger.finish_run(id, result).await {
        tracing::warn!("run ledger: finish failed: {:#}", e);
    }
}

fn print_result(result: &BatchResult, dry_run: bool) {
    for report in &result.reports {
        println!("{}", report.summary_line());
        if dry_run {
            for c in &report.candidates {
                println!(
                    "  {}  {}  {}",
                    c.published_at.format("%Y-%m-%d %H:%M"),
                    c.video_id,
                    c.title
                );
            }
        }
    }
    println!(
        "Found {} new video(s): {} download(s) attempted, {} failed, {} already archived.",
        result.total_candidates_found,
        result.total_fetch_attempts,
        result.total_fetch_failures,
        result.total_skipped_archived
    );
    if result.stop == StopReason::QuotaExhausted {
        println!("API quota exhausted; remaining sources will be checked on the next run.");
    }
}
