//! CLI command handlers, one file per command.

mod completions;
mod failures;
mod history;
mod man;
mod run;
mod sources;

pub use completions::run_completions;
pub use failures::run_failures;
pub use history::run_history;
pub use man::run_man;
pub use run::{run_batch, RunOverrides};
pub use sources::run_sources;
