use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{
    cache::{find_video_in_dir, is_video_file},
    error::{Result, VidquizError},
};

pub const DEFAULT_FORMAT: &str = "best[ext=mp4]/best";

/// Fetches a video into a local directory.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Download `url` into `work_dir` and return the path of the video file.
    async fn fetch(&self, url: &str, work_dir: &Path) -> Result<PathBuf>;
}

/// Downloads with the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    format: String,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl VideoSource for YtDlp {
    async fn fetch(&self, url: &str, work_dir: &Path) -> Result<PathBuf> {
        let output_template = work_dir.join("%(id)s.%(ext)s");
        let output = Command::new(&self.program)
            .arg(url)
            .arg("--no-playlist")
            .arg("--print")
            .arg("after_move:filepath")
            .arg("-f")
            .arg(&self.format)
            .arg("-o")
            .arg(&output_template)
            .output()
            .await
            .map_err(|e| VidquizError::DownloadFailed {
                url: url.to_string(),
                reason: format!("could not run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(VidquizError::DownloadFailed {
                url: url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout_str = String::from_utf8_lossy(&output.stdout);
        let printed = stdout_str
            .lines()
            .map(str::trim)
            .rev()
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
            .filter(|path| path.is_file() && is_video_file(path));

        if let Some(path) = printed {
            debug!(url, file = %path.display(), "download complete");
            return Ok(path);
        }

        warn!(url, "yt-dlp did not report a video path, scanning work dir");
        find_video_in_dir(work_dir).ok_or_else(|| VidquizError::DownloadFailed {
            url: url.to_string(),
            reason: "no video file was produced".to_string(),
        })
    }
}
