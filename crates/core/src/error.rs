use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidquizError {
    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Failed to read input {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Input {path} is not a JSON array of video objects: {source}")]
    InputInvalid {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Remote analysis failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("Missing API key: set {env_var} (or GEMINI_API_KEY) in the environment or a .env file")]
    MissingApiKey { env_var: String },
}

/// Failures talking to the remote analysis service.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Upload of {path} was not accepted: no upload URL returned")]
    MissingUploadUrl { path: PathBuf },

    #[error("Remote processing of {name} failed")]
    ProcessingFailed { name: String },

    #[error("timeout waiting for {name} to become ready after {}s", waited.as_secs())]
    ReadyTimeout { name: String, waited: Duration },

    #[error("No text content in response from {model}")]
    EmptyResponse { model: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VidquizError>;
