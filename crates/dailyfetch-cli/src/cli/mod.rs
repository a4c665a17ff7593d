//! CLI for dailyfetch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use dailyfetch_core::config;
use std::path::PathBuf;

use commands::{
    run_batch, run_completions, run_failures, run_history, run_man, run_sources, RunOverrides,
};

/// Top-level CLI for dailyfetch.
#[derive(Debug, Parser)]
#[command(name = "dailyfetch", version)]
#[command(
    about = "dailyfetch: fetch recent uploads from YouTube channels and playlists with yt-dlp",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Discover recent videos in every source and download the new ones.
    Run {
        /// Channel list (one channel id per line; `>>` keywords; `#` label).
        #[arg(long, value_name = "FILE")]
        channels: Option<PathBuf>,
        /// Playlist list (same line format as channels).
        #[arg(long, value_name = "FILE")]
        playlists: Option<PathBuf>,
        /// Root directory; each source downloads into `<DIR>/<container id>`.
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
        /// Downloads in flight per source.
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Only videos published within the last H hours are candidates.
        #[arg(long, value_name = "H")]
        window_hours: Option<u32>,
        /// Stop paging a source once a full page is older than the window.
        #[arg(long)]
        early_exit: bool,
        /// Discover and print candidates without downloading.
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse the source lists and print what would be walked.
    Sources {
        #[arg(long, value_name = "FILE")]
        channels: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        playlists: Option<PathBuf>,
    },

    /// Show recent runs from the run ledger.
    History {
        /// Number of runs to show.
        #[arg(long, default_value = "10", value_name = "N")]
        limit: u32,
    },

    /// List failed downloads of a run (latest run by default).
    Failures {
        /// Run identifier from `history`.
        #[arg(long, value_name = "ID")]
        run: Option<i64>,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                channels,
                playlists,
                data_dir,
                workers,
                window_hours,
                early_exit,
                dry_run,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let overrides = RunOverrides {
                    channels,
                    playlists,
                    data_dir,
                    workers,
                    window_hours,
                    early_exit,
                };
                run_batch(overrides.apply(cfg), dry_run).await?;
            }
            CliCommand::Sources {
                channels,
                playlists,
            } => {
                let cfg = config::load_or_init()?;
                run_sources(
                    &channels.unwrap_or(cfg.channels_file),
                    &playlists.unwrap_or(cfg.playlists_file),
                )?;
            }
            CliCommand::History { limit } => run_history(limit).await?,
            CliCommand::Failures { run } => run_failures(run).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
