use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::RemoteError;

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    #[default]
    #[serde(other)]
    StateUnspecified,
}

/// Handle to a media file held by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub state: FileState,
}

/// The three operations the pipeline needs from the analysis service.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<RemoteFile, RemoteError>;

    async fn get_file(&self, name: &str) -> Result<RemoteFile, RemoteError>;

    /// Run `instruction` against a ready file and return the model's text.
    async fn generate(&self, file: &RemoteFile, instruction: &str) -> Result<String, RemoteError>;
}
