use std::time::Duration;

use crate::error::{Result, VidquizError};

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const API_KEY_FALLBACK_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Upload and generation can take minutes for long videos.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings for the Gemini API, built once at startup and handed to
/// the client.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Let the model ground its answers with Google Search.
    pub search: bool,
    pub request_timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            search: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read the API key from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        [API_KEY_ENV, API_KEY_FALLBACK_ENV]
            .into_iter()
            .filter_map(|name| lookup(name))
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .map(Self::new)
            .ok_or_else(|| VidquizError::MissingApiKey {
                env_var: API_KEY_ENV.to_string(),
            })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_search(mut self, search: bool) -> Self {
        self.search = search;
        self
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("search", &self.search)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_prefers_google_api_key() {
        let config =
            GeminiConfig::from_lookup(lookup(&[(API_KEY_ENV, "g"), (API_KEY_FALLBACK_ENV, "f")]))
                .unwrap();
        assert_eq!(config.api_key, "g");
    }

    #[test]
    fn test_falls_back_to_gemini_api_key() {
        let config =
            GeminiConfig::from_lookup(lookup(&[(API_KEY_ENV, "  "), (API_KEY_FALLBACK_ENV, "f")]))
                .unwrap();
        assert_eq!(config.api_key, "f");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = GeminiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, VidquizError::MissingApiKey { .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", GeminiConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = GeminiConfig::new("k").with_base_url("http://localhost:1234/");
        assert_eq!(config.base_url, "http://localhost:1234");
    }
}
