//! Tests for the run subcommand and its config overrides.

use super::parse;
use crate::cli::commands::RunOverrides;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use dailyfetch_core::config::FetchConfig;
use std::path::{Path, PathBuf};

#[test]
fn cli_parse_run_defaults() {
    match parse(&["dailyfetch", "run"]) {
        CliCommand::Run {
            channels,
            playlists,
            data_dir,
            workers,
            window_hours,
            early_exit,
            dry_run,
        } => {
            assert!(channels.is_none());
            assert!(playlists.is_none());
            assert!(data_dir.is_none());
            assert!(workers.is_none());
            assert!(window_hours.is_none());
            assert!(!early_exit);
            assert!(!dry_run);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_all_flags() {
    match parse(&[
        "dailyfetch",
        "run",
        "--channels",
        "/etc/dailyfetch/channels.txt",
        "--playlists",
        "lists/playlists.txt",
        "--data-dir",
        "/srv/videos",
        "--workers",
        "8",
        "--window-hours",
        "24",
        "--early-exit",
        "--dry-run",
    ]) {
        CliCommand::Run {
            channels,
            playlists,
            data_dir,
            workers,
            window_hours,
            early_exit,
            dry_run,
        } => {
            assert_eq!(
                channels.as_deref(),
                Some(Path::new("/etc/dailyfetch/channels.txt"))
            );
            assert_eq!(playlists.as_deref(), Some(Path::new("lists/playlists.txt")));
            assert_eq!(data_dir.as_deref(), Some(Path::new("/srv/videos")));
            assert_eq!(workers, Some(8));
            assert_eq!(window_hours, Some(24));
            assert!(early_exit);
            assert!(dry_run);
        }
        _ => panic!("expected Run with flags"),
    }
}

#[test]
fn cli_parse_run_rejects_bad_workers() {
    assert!(Cli::try_parse_from(["dailyfetch", "run", "--workers", "many"]).is_err());
}

#[test]
fn overrides_replace_only_given_values() {
    let cfg = RunOverrides {
        data_dir: Some(PathBuf::from("/srv/videos")),
        workers: Some(0),
        ..Default::default()
    }
    .apply(FetchConfig::default());

    let defaults = FetchConfig::default();
    assert_eq!(cfg.data_dir, PathBuf::from("/srv/videos"));
    assert_eq!(cfg.workers, 1, "workers clamp to at least one");
    assert_eq!(cfg.channels_file, defaults.channels_file);
    assert_eq!(cfg.window_hours, defaults.window_hours);
    assert!(!cfg.early_exit);
}

#[test]
fn early_exit_flag_turns_on_but_never_off() {
    let mut base = FetchConfig::default();
    base.early_exit = true;
    let cfg = RunOverrides::default().apply(base);
    assert!(cfg.early_exit);

    let cfg = RunOverrides {
        early_exit: true,
        window_hours: Some(12),
        ..Default::default()
    }
    .apply(FetchConfig::default());
    assert!(cfg.early_exit);
    assert_eq!(cfg.window_hours, 12);
}
