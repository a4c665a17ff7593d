//! Run ledger (SQLite via sqlx).
//!
//! One row per batch run with its totals, and one row per dispatched or
//! skipped video so failed fetches can be listed and retried by hand.

mod db;
mod runs;
mod types;

pub use db::RunLedger;
pub use types::{FailedFetch, RunId, RunState, RunSummary};
