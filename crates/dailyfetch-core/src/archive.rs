//! Per-destination download archive (`<destination>/archive.txt`).
//!
//! The file uses the download tool's archive format, one `youtube <video_id>`
//! line per fetched video, and is only ever appended to. The tool checks and
//! appends on its own; the gate adds the orchestrator's side of the contract:
//! skip ids already archived before dispatch, never hand the same id to two
//! workers, and make sure every successful id lands in the file exactly once
//! through a single serialized writer.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::discovery::VideoCandidate;

pub const ARCHIVE_FILE: &str = "archive.txt";
const EXTRACTOR: &str = "youtube";

/// Candidates split by the gate before dispatch.
#[derive(Debug, Default)]
pub struct Partition {
    pub to_fetch: Vec<VideoCandidate>,
    /// Already in the archive from a previous run.
    pub archived: Vec<VideoCandidate>,
    /// Repeated ids within this dispatch (only the first occurrence is fetched).
    pub duplicates: usize,
}

/// Single logical writer for one destination's archive. Share it behind an `Arc`.
#[derive(Debug)]
pub struct ArchiveGate {
    path: PathBuf,
    writer: Mutex<()>,
}

impl ArchiveGate {
    pub fn for_destination(destination: &Path) -> Self {
        Self {
            path: destination.join(ARCHIVE_FILE),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids currently recorded. A missing file is an empty archive.
    pub fn load(&self) -> Result<HashSet<String>> {
        let mut text = String::new();
        match File::open(&self.path) {
            Ok(mut f) => {
                f.read_to_string(&mut text)
                    .with_context(|| format!("read archive {}", self.path.display()))?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("open archive {}", self.path.display()))
            }
        }
        Ok(parse_ids(&text))
    }

    pub fn contains(&self, video_id: &str) -> Result<bool> {
        Ok(self.load()?.contains(video_id))
    }

    /// Split candidates into those to fetch and those already archived, dropping
    /// repeated ids so no two workers target the same video. Order is preserved.
    pub fn partition(&self, candidates: Vec<VideoCandidate>) -> Result<Partition> {
        let archived_ids = self.load()?;
        let mut seen = HashSet::new();
        let mut out = Partition::default();
        for c in candidates {
            if !seen.insert(c.video_id.clone()) {
                out.duplicates += 1;
                continue;
            }
            if archived_ids.contains(&c.video_id) {
                out.archived.push(c);
            } else {
                out.to_fetch.push(c);
            }
        }
        Ok(out)
    }

    /// Record a successfully fetched id. Serialized per destination (in-process mutex plus an
    /// advisory file lock against other processes); appends only when the id is absent.
    /// Returns true if a line was written.
    pub fn record(&self, video_id: &str) -> Result<bool> {
        let _guard = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("archive writer lock poisoned"))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("open archive {}", self.path.display()))?;
        lock_exclusive(&file)?;

        let mut text = String::new();
        file.read_to_string(&mut text)
            .with_context(|| format!("read archive {}", self.path.display()))?;
        if parse_ids(&text).contains(video_id) {
            return Ok(false);
        }

        let mut line = String::new();
        if !text.is_empty() && !text.ends_with('\n') {
            // A writer died mid-line; start ours on a fresh one.
            line.push('\n');
        }
        line.push_str(&format!("{} {}\n", EXTRACTOR, video_id));
        file.write_all(line.as_bytes())
            .with_context(|| format!("append to archive {}", self.path.display()))?;
        file.sync_data()
            .with_context(|| format!("sync archive {}", self.path.display()))?;
        Ok(true)
    }
}

/// Accepts `youtube <id>` lines and bare ids; ignores blanks.
fn parse_ids(text: &str) -> HashSet<String> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let first = parts.next()?;
            Some(parts.next().unwrap_or(first).to_string())
        })
        .collect()
}

/// Exclusive advisory lock, released when `file` is closed.
#[cfg(unix)]
fn lock_exclusive(file: &File) -> Result<()> {
    use std::os::unix::io::AsRawFd;
    let r = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
    if r != 0 {
        return Err(std::io::Error::last_os_error()).context("flock archive");
    }
    Ok(())
}

#[cfg(not(unix))]
fn lock_exclusive(_file: &File) -> Result<()> {
    Ok(())
}
