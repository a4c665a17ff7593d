pub mod api;
pub mod archive;
pub mod config;
pub mod discovery;
pub mod fetch;
pub mod ledger;
pub mod logging;
pub mod retry;
pub mod scheduler;
pub mod sources;
