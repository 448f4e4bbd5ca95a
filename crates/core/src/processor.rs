use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::{fs, time::Instant};
use tracing::{debug, error, info, warn};

use crate::{
    cache::{create_work_dir, get_root_cache_dir},
    error::RemoteError,
    parser::parse_analysis,
    prompt::ANALYSIS_PROMPT,
    remote::{AnalysisService, FileState, RemoteFile},
    source::VideoSource,
    types::Analysis,
};

pub const DOWNLOAD_FAILED: &str = "Download failed";

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Delay between readiness checks of an uploaded file.
    pub poll_interval: Duration,
    /// Upper bound on the total readiness wait.
    pub ready_timeout: Duration,
    pub instruction: String,
    /// Per-video work directories are created under this root.
    pub work_root: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            ready_timeout: Duration::from_secs(600),
            instruction: ANALYSIS_PROMPT.to_string(),
            work_root: get_root_cache_dir(),
        }
    }
}

/// Runs one video through download, remote analysis, parsing and cleanup.
pub struct VideoProcessor {
    source: Box<dyn VideoSource>,
    service: Box<dyn AnalysisService>,
    config: ProcessorConfig,
}

impl VideoProcessor {
    pub fn new(
        source: impl VideoSource + 'static,
        service: impl AnalysisService + 'static,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            source: Box::new(source),
            service: Box::new(service),
            config,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process one URL. Every failure is folded into [`Analysis::Failed`].
    pub async fn process(&self, url: &str) -> Analysis {
        let work_dir = match create_work_dir(&self.config.work_root).await {
            Ok(dir) => dir,
            Err(e) => {
                error!(url, error = %e, "could not create work directory");
                return Analysis::failed(format!("Could not create work directory: {e}"));
            }
        };

        let analysis = self.process_in(url, &work_dir).await;
        remove_work_dir(&work_dir).await;
        analysis
    }

    async fn process_in(&self, url: &str, work_dir: &Path) -> Analysis {
        let video = match self.source.fetch(url, work_dir).await {
            Ok(path) => path,
            Err(e) => {
                warn!(url, error = %e, "skipping analysis, download failed");
                return Analysis::failed(DOWNLOAD_FAILED);
            }
        };
        info!(url, file = %video.display(), "video downloaded");

        match self.analyze_video(&video).await {
            Ok(text) => {
                let result = parse_analysis(&text);
                info!(url, questions = result.qa.len(), "analysis complete");
                Analysis::Completed(result)
            }
            Err(e) => {
                error!(url, error = %e, "analysis failed");
                Analysis::failed(e.to_string())
            }
        }
    }

    async fn analyze_video(&self, video: &Path) -> Result<String, RemoteError> {
        let uploaded = self.service.upload(video).await?;
        let ready = self.wait_until_ready(uploaded).await?;
        let text = self
            .service
            .generate(&ready, &self.config.instruction)
            .await?;
        debug!(file = %ready.name, response = %text, "raw analysis response");
        Ok(text)
    }

    async fn wait_until_ready(&self, mut file: RemoteFile) -> Result<RemoteFile, RemoteError> {
        let started = Instant::now();

        while file.state == FileState::Processing {
            if started.elapsed() >= self.config.ready_timeout {
                return Err(RemoteError::ReadyTimeout {
                    name: file.name,
                    waited: started.elapsed(),
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
            file = self.service.get_file(&file.name).await?;
            debug!(file = %file.name, state = ?file.state, "polled file state");
        }

        if file.state == FileState::Failed {
            return Err(RemoteError::ProcessingFailed { name: file.name });
        }
        Ok(file)
    }
}

async fn remove_work_dir(work_dir: &Path) {
    if let Err(e) = fs::remove_dir_all(work_dir).await {
        warn!(dir = %work_dir.display(), error = %e, "failed to remove temporary files");
    }
}
