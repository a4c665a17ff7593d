//! `dailyfetch failures`: failed downloads of a run, with URLs to retry by hand.

use anyhow::Result;
use dailyfetch_core::ledger::{RunId, RunLedger};

pub async fn run_failures(run: Option<RunId>) -> Result<()> {
    let ledger = RunLedger::open_default().await?;
    let failed = ledger.list_failures(run).await?;
    if failed.is_empty() {
        println!("No failed downloads.");
        return Ok(());
    }
    for f in failed {
        println!("[run {}] {}: {} {}", f.run_id, f.source_label, f.watch_url(), f.title);
        if let Some(detail) = f.detail.as_deref().and_then(|d| d.lines().last()) {
            println!("    {}", detail);
        }
    }
    Ok(())
}
