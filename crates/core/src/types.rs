use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the analysis outcome is attached to a descriptor.
pub const ANALYSIS_KEY: &str = "analysis";

/// One input record. Every field is passed through untouched except `url`,
/// which drives processing, and `analysis`, which is written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoDescriptor(pub Map<String, Value>);

impl VideoDescriptor {
    /// The video URL, if present as a non-empty string.
    pub fn url(&self) -> Option<&str> {
        self.0
            .get("url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn set_analysis(&mut self, analysis: &Analysis) {
        let value = match analysis {
            Analysis::Completed(result) => serde_json::json!({
                "summary": result.summary,
                "qa": result.qa,
            }),
            Analysis::Failed(failure) => serde_json::json!({ "error": failure.error }),
        };
        self.0.insert(ANALYSIS_KEY.to_string(), value);
    }

    pub fn analysis(&self) -> Option<Analysis> {
        self.0
            .get(ANALYSIS_KEY)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

impl From<Value> for VideoDescriptor {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Outcome of processing one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Analysis {
    Completed(AnalysisResult),
    Failed(AnalysisError),
}

impl Analysis {
    pub fn failed(error: impl Into<String>) -> Self {
        Analysis::Failed(AnalysisError {
            error: error.into(),
        })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Analysis::Failed(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub qa: Vec<QaEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
    pub context: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(value: Value) -> VideoDescriptor {
        VideoDescriptor::from(value)
    }

    #[test]
    fn test_url_requires_non_empty_string() {
        assert_eq!(
            descriptor(json!({"url": "https://example.com/v1"})).url(),
            Some("https://example.com/v1")
        );
        assert_eq!(descriptor(json!({"url": ""})).url(), None);
        assert_eq!(descriptor(json!({"url": 42})).url(), None);
        assert_eq!(descriptor(json!({"title": "T"})).url(), None);
    }

    #[test]
    fn test_analysis_is_appended_after_existing_fields() {
        let mut video = descriptor(json!({"url": "https://example.com/v1", "title": "T"}));
        video.set_analysis(&Analysis::failed("Download failed"));

        let keys: Vec<&str> = video.0.keys().map(String::as_str).collect();
        assert_eq!(keys, ["url", "title", "analysis"]);
        assert_eq!(video.0["analysis"], json!({"error": "Download failed"}));
    }

    #[test]
    fn test_completed_analysis_shape() {
        let mut video = descriptor(json!({"url": "u"}));
        video.set_analysis(&Analysis::Completed(AnalysisResult {
            summary: "S".to_string(),
            qa: vec![QaEntry {
                question: "Q".to_string(),
                answer: "A".to_string(),
                context: "C".to_string(),
            }],
        }));

        assert_eq!(
            video.0["analysis"],
            json!({"summary": "S", "qa": [{"question": "Q", "answer": "A", "context": "C"}]})
        );
        assert!(matches!(video.analysis(), Some(Analysis::Completed(_))));
    }

    #[test]
    fn test_error_analysis_round_trips_as_failed() {
        let video = descriptor(json!({"url": "u", "analysis": {"error": "boom"}}));
        assert_eq!(video.analysis(), Some(Analysis::failed("boom")));
    }
}
