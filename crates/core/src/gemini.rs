//! Gemini REST client: resumable file upload, file status and `generateContent`.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
    cache::video_mime_type,
    error::RemoteError,
    prompt::SYSTEM_PROMPT,
    provider::GeminiConfig,
    remote::{AnalysisService, RemoteFile},
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn generate_body(&self, file: &RemoteFile, instruction: &str) -> Value {
        let mut body = json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_PROMPT }],
            },
            "contents": [{
                "role": "user",
                "parts": [
                    { "fileData": { "mimeType": file.mime_type, "fileUri": file.uri } },
                    { "text": instruction },
                ],
            }],
        });

        if self.config.search {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }

        body
    }
}

/// Turn a non-2xx response into an API error, keeping the service's message.
async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);

    Err(RemoteError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AnalysisService for GeminiClient {
    async fn upload(&self, path: &Path) -> Result<RemoteFile, RemoteError> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = video_mime_type(path);
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());

        info!(file = %path.display(), size = bytes.len(), "uploading video");

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.config.base_url))
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| RemoteError::MissingUploadUrl {
                path: path.to_path_buf(),
            })?;

        let finished = self
            .client
            .post(upload_url)
            .header("X-Goog-Upload-Offset", 0)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadResponse = check_status(finished).await?.json().await?;

        debug!(name = %uploaded.file.name, state = ?uploaded.file.state, "upload accepted");
        Ok(uploaded.file)
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, RemoteError> {
        let response = self
            .client
            .get(format!("{}/v1beta/{}", self.config.base_url, name))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn generate(&self, file: &RemoteFile, instruction: &str) -> Result<String, RemoteError> {
        info!(model = %self.config.model, file = %file.name, "requesting analysis");

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.config.base_url, self.config.model
            ))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&self.generate_body(file, instruction))
            .send()
            .await?;
        let response: GenerateResponse = check_status(response).await?.json().await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RemoteError::EmptyResponse {
                model: self.config.model.clone(),
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use super::*;
    use crate::remote::FileState;

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = GeminiConfig::new("test-key").with_base_url(server.uri());
        GeminiClient::new(config).unwrap()
    }

    fn active_file() -> RemoteFile {
        RemoteFile {
            name: "files/abc123".to_string(),
            uri: "https://example.com/files/abc123".to_string(),
            mime_type: "video/mp4".to_string(),
            state: FileState::Active,
        }
    }

    #[tokio::test]
    async fn test_upload_runs_resumable_protocol() {
        let server = MockServer::start().await;
        let upload_url = format!("{}/resumable/session-1", server.uri());

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(header("x-goog-api-key", "test-key"))
            .and(header("X-Goog-Upload-Command", "start"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("x-goog-upload-url", upload_url.as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/resumable/session-1"))
            .and(header("X-Goog-Upload-Offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {
                    "name": "files/abc123",
                    "uri": "https://example.com/files/abc123",
                    "mimeType": "video/mp4",
                    "state": "PROCESSING"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"not really a video").unwrap();

        let file = client_for(&server).upload(&video).await.unwrap();
        assert_eq!(file.name, "files/abc123");
        assert_eq!(file.state, FileState::Processing);
    }

    #[tokio::test]
    async fn test_upload_without_session_url_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"x").unwrap();

        let err = client_for(&server).upload(&video).await.unwrap_err();
        assert!(matches!(err, RemoteError::MissingUploadUrl { .. }));
    }

    #[tokio::test]
    async fn test_get_file_parses_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/abc123",
                "uri": "https://example.com/files/abc123",
                "mimeType": "video/mp4",
                "state": "ACTIVE",
                "sizeBytes": "18"
            })))
            .mount(&server)
            .await;

        let file = client_for(&server).get_file("files/abc123").await.unwrap();
        assert_eq!(file.state, FileState::Active);
    }

    #[tokio::test]
    async fn test_api_error_message_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "File missing not found.", "status": "NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_file("files/missing").await.unwrap_err();
        match err {
            RemoteError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "File missing not found.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_joins_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(body_partial_json(json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "fileData": { "mimeType": "video/mp4", "fileUri": "https://example.com/files/abc123" } },
                        { "text": "describe it" }
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "**Summary:** " }, { "text": "A clip." }] }
                }]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate(&active_file(), "describe it")
            .await
            .unwrap();
        assert_eq!(text, "**Summary:** A clip.");
    }

    #[tokio::test]
    async fn test_generate_without_text_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&active_file(), "describe it")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::EmptyResponse { .. }));
    }

    #[test]
    fn test_search_tool_only_when_enabled() {
        let plain = GeminiClient::new(GeminiConfig::new("k")).unwrap();
        assert!(plain.generate_body(&active_file(), "x").get("tools").is_none());

        let grounded = GeminiClient::new(GeminiConfig::new("k").with_search(true)).unwrap();
        assert_eq!(
            grounded.generate_body(&active_file(), "x")["tools"],
            json!([{ "googleSearch": {} }])
        );
    }
}
