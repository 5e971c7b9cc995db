//! # Gemini Client
//!
//! REST client for `POST {base_url}/v1beta/models/{model}:generateContent`.
//!
//! - API key sent in the `x-goog-api-key` header
//! - JSON response mode whenever the request carries a schema
//! - Non-2xx responses map to [`GenerationError::Api`]

use async_trait::async_trait;
use config::GenerationConfig;
use errors::GenerationError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::llm::{LlmClient, LlmRequest, Part};

pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GenerationError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| GenerationError::request_failed(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fails with [`GenerationError::NotConfigured`] when no API key is set.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerationError::NotConfigured {
                reason: "missing API key (set SN_API_KEY)".to_string(),
            })?;

        Self::new(
            config.base_url.clone(),
            api_key,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentBody<'a>>,
    contents: Vec<ContentBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationSettings<'a>>,
}

#[derive(Serialize)]
struct ContentBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn wire_parts(parts: &[Part]) -> Vec<WirePart<'_>> {
    parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => WirePart::Text { text },
            Part::InlineImage { mime_type, data } => WirePart::Inline {
                inline_data: InlineData { mime_type, data },
            },
        })
        .collect()
}

fn request_body(request: &LlmRequest) -> GenerateContentRequest<'_> {
    let system_instruction = request
        .system_instruction
        .as_deref()
        .map(|text| ContentBody {
            role: None,
            parts: vec![WirePart::Text { text }],
        });

    let generation_config =
        if request.response_schema.is_some() || request.thinking_budget.is_some() {
            Some(GenerationSettings {
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json"),
                response_schema: request.response_schema.as_ref(),
                thinking_config: request
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            })
        } else {
            None
        };

    GenerateContentRequest {
        system_instruction,
        contents: vec![ContentBody {
            role: Some("user"),
            parts: wire_parts(&request.parts),
        }],
        generation_config,
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: LlmRequest) -> Result<String, GenerationError> {
        let url = self.endpoint(&request.model);
        debug!(model = %request.model, parts = request.parts.len(), "Sending generateContent request");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(&request))
            .send()
            .await
            .map_err(|e| GenerationError::request_failed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            warn!(status, model = %request.model, "Generation API error: {}", message);
            return Err(GenerationError::Api { status, message });
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::invalid_response(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = LlmRequest::new("gemini-3-pro-preview", "Explain torque")
            .with_system("Output valid JSON.")
            .with_schema(serde_json::json!({"type": "OBJECT"}))
            .with_thinking_budget(2048)
            .with_part(Part::jpeg("aGVsbG8="));

        let body = serde_json::to_value(request_body(&request)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Output valid JSON.");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Explain torque");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            2048
        );
    }

    #[test]
    fn test_plain_request_has_no_generation_config() {
        let request = LlmRequest::new("gemini-3-flash-preview", "Summarize");
        let body = serde_json::to_value(request_body(&request)).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = GenerationConfig::default();
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(GenerationError::NotConfigured { .. })
        ));
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_client_for_mock(mock_server: &MockServer) -> GeminiClient {
        GeminiClient::new(mock_server.uri(), "test-key", Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-3-flash-preview:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            {"text": "thinking...", "thought": true},
                            {"text": "{\"isContinuation\":"},
                            {"text": "true}"}
                        ]
                    }
                }]
            })))
            .mount(&mock_server)
            .await;

        let client = create_client_for_mock(&mock_server);
        let text = client
            .generate(LlmRequest::new("gemini-3-flash-preview", "prompt"))
            .await
            .unwrap();

        assert_eq!(text, "{\"isContinuation\":true}");
    }

    #[tokio::test]
    async fn test_generate_maps_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-3-pro-preview:generateContent"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
            })))
            .mount(&mock_server)
            .await;

        let client = create_client_for_mock(&mock_server);
        let result = client
            .generate(LlmRequest::new("gemini-3-pro-preview", "prompt"))
            .await;

        assert_eq!(
            result,
            Err(GenerationError::Api {
                status: 403,
                message: "API key not valid".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_generate_without_candidates_is_empty_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&mock_server)
            .await;

        let client = create_client_for_mock(&mock_server);
        let result = client.generate(LlmRequest::new("any", "prompt")).await;

        assert_eq!(result, Err(GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_generate_with_unparseable_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_client_for_mock(&mock_server);
        let result = client.generate(LlmRequest::new("any", "prompt")).await;

        assert!(matches!(result, Err(GenerationError::InvalidResponse { .. })));
    }
}
