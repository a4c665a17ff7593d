//! Source registry: parse the channel and playlist lists into `Source` records.
//!
//! Line format (both lists):
//!
//! ```text
//! UCxxxxxxxxxxxxxxxxxxxxxx >> keyword one, keyword two   # Display label
//! PLxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx                     # Another label
//! ```
//!
//! Malformed lines are logged and skipped; they never fail the batch.

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

/// Length of an upload container id derived from a channel id.
pub const CONTAINER_ID_LEN: usize = 24;

const CHANNEL_PREFIX: &str = "UC";
const UPLOADS_PREFIX: &str = "UU";

/// Which list a source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Channel,
    Playlist,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Channel => "channel",
            SourceKind::Playlist => "playlist",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One container to walk: a channel's uploads playlist or a playlist listed directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Upstream playlist id passed to `playlistItems.list`.
    pub container_id: String,
    /// Case-insensitive title filter; empty means every title matches.
    pub keywords: Vec<String>,
    /// Human-readable name from the line's `#` comment, or the container id.
    pub label: String,
    pub kind: SourceKind,
}

/// Parse the channel list. `UC…` ids are rewritten to their `UU…` uploads container
/// and cut to exactly 24 characters.
pub fn parse_channel_sources(text: &str) -> Vec<Source> {
    parse_lines(text, SourceKind::Channel)
}

/// Parse the playlist list. Ids are used as written.
pub fn parse_playlist_sources(text: &str) -> Vec<Source> {
    parse_lines(text, SourceKind::Playlist)
}

fn parse_lines(text: &str, kind: SourceKind) -> Vec<Source> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line, kind) {
            Ok(source) => out.push(source),
            Err(reason) => {
                tracing::warn!(line = idx + 1, kind = %kind, "skipping source line {:?}: {}", line, reason);
            }
        }
    }
    out
}

fn parse_line(line: &str, kind: SourceKind) -> std::result::Result<Source, String> {
    let (body, comment) = match line.split_once('#') {
        Some((body, comment)) => (body, comment.trim()),
        None => (line, ""),
    };
    let (ident, keywords) = match body.split_once(">>") {
        Some((ident, keywords)) => (ident, parse_keywords(keywords)),
        None => (body, Vec::new()),
    };
    let ident = ident
        .split_whitespace()
        .next()
        .ok_or_else(|| "missing identifier".to_string())?;

    let container_id = match kind {
        SourceKind::Channel => channel_to_container(ident)?,
        SourceKind::Playlist => {
            if ident.chars().count() < CONTAINER_ID_LEN {
                return Err(format!(
                    "identifier {:?} is shorter than {} characters",
                    ident, CONTAINER_ID_LEN
                ));
            }
            ident.to_string()
        }
    };

    let label = if comment.is_empty() {
        container_id.clone()
    } else {
        comment.to_string()
    };

    Ok(Source {
        container_id,
        keywords,
        label,
        kind,
    })
}

/// Rewrite a `UC…` channel id to its `UU…` uploads playlist and validate the length.
fn channel_to_container(ident: &str) -> std::result::Result<String, String> {
    let rewritten = match ident.strip_prefix(CHANNEL_PREFIX) {
        Some(rest) => format!("{}{}", UPLOADS_PREFIX, rest),
        None => ident.to_string(),
    };
    if rewritten.chars().count() < CONTAINER_ID_LEN {
        return Err(format!(
            "identifier {:?} is shorter than {} characters",
            ident, CONTAINER_ID_LEN
        ));
    }
    Ok(rewritten.chars().take(CONTAINER_ID_LEN).collect())
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read one list from disk. A missing file is an empty list (with a warning);
/// any other read failure is a configuration error.
fn read_list(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("source list {} not found; treating as empty", path.display());
            Ok(String::new())
        }
        Err(e) => Err(e).with_context(|| format!("read source list {}", path.display())),
    }
}

/// Load both lists: channel-derived sources first, then playlists, each in file order.
pub fn load_sources(channels_file: &Path, playlists_file: &Path) -> Result<Vec<Source>> {
    let mut sources = parse_channel_sources(&read_list(channels_file)?);
    let channels = sources.len();
    sources.extend(parse_playlist_sources(&read_list(playlists_file)?));
    tracing::info!(
        channels,
        playlists = sources.len() - channels,
        "loaded {} source(s)",
        sources.len()
    );
    Ok(sources)
}
