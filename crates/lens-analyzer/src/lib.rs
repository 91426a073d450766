//! # lens-analyzer
//!
//! HTTP client for the external generative-text service that produces
//! Classlens stage analyses.
//!
//! One call per stage: `POST {endpoint}/analyze` with the stage payload,
//! answered by either `{"text": "..."}` or `{"result": {...}}`. A `result`
//! object is returned as its JSON text so storage stays opaque. The client
//! never retries; rate limits and failures are surfaced to the caller.

mod error;
mod http;

pub use error::AnalyzerError;

use std::time::Duration;

use lens_config::AnalyzerConfig;
use lens_core::entities::StagePayload;
use serde::{Deserialize, Serialize};

use crate::http::check_response;

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(flatten)]
    payload: &'a StagePayload,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

impl AnalyzeResponse {
    /// Pick the usable output, preferring `text` over `result`.
    fn into_output(self) -> Result<String, AnalyzerError> {
        if let Some(text) = self.text.filter(|t| !t.trim().is_empty()) {
            return Ok(text);
        }
        match self.result {
            Some(serde_json::Value::String(text)) if !text.trim().is_empty() => Ok(text),
            Some(serde_json::Value::Object(map)) if !map.is_empty() => {
                Ok(serde_json::Value::Object(map).to_string())
            }
            _ => Err(AnalyzerError::EmptyOutput),
        }
    }
}

/// Client for the analysis service.
pub struct AnalyzerClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: Option<String>,
}

impl AnalyzerClient {
    /// Build a client from the `[analyzer]` config section.
    ///
    /// # Errors
    ///
    /// Returns `AnalyzerError::Config` if the section is unusable, or
    /// `AnalyzerError::Http` if the HTTP client cannot be built.
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config
            .validate()
            .map_err(|e| AnalyzerError::Config(e.to_string()))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("classlens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
            model: Some(config.model.clone()).filter(|m| !m.is_empty()),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one stage analysis.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError`] if the request fails, the service answers
    /// with a non-success status, or the body holds no usable output.
    pub async fn analyze(&self, payload: &StagePayload) -> Result<String, AnalyzerError> {
        let url = format!("{}/analyze", self.endpoint);
        let body = AnalyzeRequest {
            model: self.model.as_deref(),
            payload,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(
            class_id = %payload.class_id,
            stage = %payload.stage,
            students = payload.students.len(),
            "calling analysis service"
        );
        let resp = check_response(request.send().await?).await?;
        let data: AnalyzeResponse = resp
            .json()
            .await
            .map_err(|e| AnalyzerError::Parse(e.to_string()))?;
        data.into_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_core::enums::StageType;
    use pretty_assertions::assert_eq;

    fn parse(raw: &str) -> AnalyzeResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn text_output_is_used_verbatim() {
        let out = parse(r###"{"text": "## Group 2\nQuiet but connected."}"###)
            .into_output()
            .unwrap();
        assert_eq!(out, "## Group 2\nQuiet but connected.");
    }

    #[test]
    fn structured_result_is_kept_as_json_text() {
        let out = parse(r#"{"result": {"overview": "cohesive"}}"#)
            .into_output()
            .unwrap();
        assert_eq!(out, r#"{"overview":"cohesive"}"#);
    }

    #[test]
    fn blank_or_missing_output_is_an_error() {
        for raw in [r#"{"text": "  "}"#, "{}", r#"{"result": {}}"#, r#"{"result": null}"#] {
            assert!(
                matches!(parse(raw).into_output(), Err(AnalyzerError::EmptyOutput)),
                "expected EmptyOutput for {raw}"
            );
        }
    }

    #[test]
    fn request_flattens_payload() {
        let payload = StagePayload {
            class_id: "cls-1".to_string(),
            class_name: "7A".to_string(),
            stage: StageType::Students4,
            group: Some(4),
            students: Vec::new(),
            roster_size: 24,
            context: serde_json::Value::Null,
        };
        let body = serde_json::to_value(AnalyzeRequest {
            model: Some("gpt-class"),
            payload: &payload,
        })
        .unwrap();
        assert_eq!(body["model"], "gpt-class");
        assert_eq!(body["stage"], "students-4");
        assert_eq!(body["group"], 4);
        assert_eq!(body["roster_size"], 24);
    }

    #[test]
    fn new_rejects_unconfigured_endpoint() {
        let err = AnalyzerClient::new(&AnalyzerConfig::default()).err().unwrap();
        assert!(matches!(err, AnalyzerError::Config(_)));
    }

    #[test]
    fn new_trims_trailing_slash() {
        let config = AnalyzerConfig {
            endpoint: "http://localhost:9000/".to_string(),
            ..AnalyzerConfig::default()
        };
        let client = AnalyzerClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000");
    }
}
