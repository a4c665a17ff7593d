//! `yt-dlp` invocation.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{FetchError, FetchJob, Fetcher};
use crate::config::DownloadConfig;

/// Lines of stderr kept for the failure log.
const DIAGNOSTIC_LINES: usize = 20;

/// Output name: upload date and id, extension chosen by the tool.
pub const OUTPUT_TEMPLATE: &str = "%(upload_date)s_%(id)s.%(ext)s";

#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    prefs: DownloadConfig,
    cookies: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(program: PathBuf, prefs: DownloadConfig, cookies: Option<PathBuf>) -> Self {
        Self {
            program,
            prefs,
            cookies,
        }
    }

    /// Arguments for one video: merged best audio+video, converted thumbnail,
    /// destination-scoped archive, dated output name.
    pub fn args(&self, job: &FetchJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--no-progress".into(),
            "--no-warnings".into(),
            "--no-playlist".into(),
            "-f".into(),
            self.prefs.format.clone().into(),
            "--merge-output-format".into(),
            self.prefs.merge_output_format.clone().into(),
            "--write-thumbnail".into(),
            "--convert-thumbnails".into(),
            self.prefs.thumbnail_format.clone().into(),
            "--download-archive".into(),
            job.archive.clone().into_os_string(),
            "-o".into(),
            job.destination.join(OUTPUT_TEMPLATE).into_os_string(),
        ];
        if let Some(cookies) = &self.cookies {
            args.push("--cookies".into());
            args.push(cookies.clone().into_os_string());
        }
        args.push(job.watch_url().into());
        args
    }
}

impl Fetcher for YtDlp {
    fn fetch(&self, job: &FetchJob) -> Result<(), FetchError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args(self.args(job))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| FetchError::Spawn {
                program: program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }
        Err(FetchError::Failed {
            program,
            status: output.status.to_string(),
            diagnostics: tail_lines(&String::from_utf8_lossy(&output.stderr), DIAGNOSTIC_LINES),
        })
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
