//! `dailyfetch history`: recent runs from the ledger.

use anyhow::Result;
use chrono::DateTime;
use dailyfetch_core::ledger::RunLedger;

pub async fn run_history(limit: u32) -> Result<()> {
    let ledger = RunLedger::open_default().await?;
    let runs = ledger.list_runs(limit).await?;
    if runs.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }
    println!(
        "{:<6} {:<16} {:<17} {:>8} {:>6} {:>8} {:>6} {:>8}",
        "ID", "STATE", "STARTED", "SOURCES", "FOUND", "FETCHED", "FAILED", "SKIPPED"
    );
    for r in runs {
        let started = DateTime::from_timestamp(r.started_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<16} {:<17} {:>8} {:>6} {:>8} {:>6} {:>8}",
            r.id,
            r.state.as_str(),
            started,
            format!("{}/{}", r.sources_processed + r.sources_failed, r.sources_total),
            r.candidates_found,
            r.fetch_attempts - r.fetch_failures,
            r.fetch_failures,
            r.skipped_archived
        );
        if let Some(err) = r.error {
            println!("       error: {}", err);
        }
    }
    Ok(())
}
