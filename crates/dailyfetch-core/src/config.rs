use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Environment variable holding the YouTube Data API key.
pub const API_KEY_ENV: &str = "YT_API_KEY";
/// Environment variable holding an optional cookies.txt path for the download tool.
pub const COOKIES_ENV: &str = "YT_COOKIES";

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per API request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 1.0 = 1s, 2s, 4s...).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::try_from_secs_f64(self.base_delay_secs.max(0.0)).unwrap_or_else(|_| {
                tracing::warn!(
                    "retry.base_delay_secs = {} is out of range; using {}s",
                    self.base_delay_secs,
                    Self::default().base_delay_secs
                );
                Duration::from_secs_f64(Self::default().base_delay_secs)
            }),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// yt-dlp format preferences (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Format selector passed to `-f`.
    pub format: String,
    /// Container used when audio and video are merged.
    pub merge_output_format: String,
    /// Image format the thumbnail is converted to.
    pub thumbnail_format: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            format: "bv*+ba/b".to_string(),
            merge_output_format: "mp4".to_string(),
            thumbnail_format: "jpg".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/dailyfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Channel list (`UC…` ids, optional `>> keyword, keyword`, optional `# label`).
    pub channels_file: PathBuf,
    /// Playlist list (container ids, optional `# label`).
    pub playlists_file: PathBuf,
    /// Root directory; each source downloads into `<data_dir>/<container_id>`.
    pub data_dir: PathBuf,
    /// Recency window in hours; items published before `now - window` are ignored.
    pub window_hours: u32,
    /// Concurrent download workers per source.
    pub workers: usize,
    /// Items requested per API page (the API caps this at 50).
    pub page_size: u32,
    /// Stop paging after a full page older than the window. Off means page to exhaustion.
    #[serde(default)]
    pub early_exit: bool,
    /// Base URL of the YouTube Data API v3.
    pub api_base_url: String,
    /// Download tool binary.
    pub yt_dlp_path: PathBuf,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional download preferences; if missing, built-in defaults are used.
    #[serde(default)]
    pub download: Option<DownloadConfig>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            channels_file: PathBuf::from("channels.txt"),
            playlists_file: PathBuf::from("playlists.txt"),
            data_dir: PathBuf::from("data"),
            window_hours: 48,
            workers: 4,
            page_size: 50,
            early_exit: false,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            yt_dlp_path: PathBuf::from("yt-dlp"),
            retry: None,
            download: None,
        }
    }
}

impl FetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn download_prefs(&self) -> DownloadConfig {
        self.download.clone().unwrap_or_default()
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.window_hours))
    }
}

/// Secrets and optional artifacts taken from the environment, never from config.toml.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub cookies: Option<PathBuf>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("cookies", &self.cookies)
            .finish()
    }
}

impl Credentials {
    /// Read `YT_API_KEY` (required) and `YT_COOKIES` (optional, kept only when the file exists).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .with_context(|| format!("environment variable {} is not set", API_KEY_ENV))?;

        let cookies = lookup(COOKIES_ENV)
            .map(|v| PathBuf::from(v.trim()))
            .filter(|p| !p.as_os_str().is_empty());
        let cookies = match cookies {
            Some(path) if path.is_file() => Some(path),
            Some(path) => {
                tracing::warn!("{} points to {}, which does not exist; ignoring", COOKIES_ENV, path.display());
                None
            }
            None => None,
        };

        Ok(Self { api_key, cookies })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dailyfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
