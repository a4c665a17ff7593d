//! Batch scheduler.
//!
//! Coordinates one run: sources → discovery (sequential, blocking pool) →
//! archive gate → bounded fetch pool per destination → totals.

mod batch;
mod dispatch;

pub use batch::{BatchDriver, BatchOptions, BatchResult, SourceReport, StopReason};
pub use dispatch::{dispatch, DispatchSummary, FetchOutcome, OutcomeStatus};
