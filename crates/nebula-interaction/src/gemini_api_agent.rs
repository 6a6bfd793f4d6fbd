//! GeminiApiAgent - Direct REST API implementation of [`ModelClient`].
//!
//! Sends one `generateContent` request with a JSON response schema. The
//! credential is passed in per call; the agent never stores it.

use async_trait::async_trait;
use nebula_core::config::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, ModelConfig};
use nebula_core::model::{ModelClient, ModelRequest, ProviderError, RawModelResponse};
use nebula_core::secret::Credential;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Model client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiApiAgent {
    /// Creates an agent for the given model on the public endpoint.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Creates an agent from the `[model]` config section.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.model_name.clone()).with_base_url(config.base_url.clone())
    }

    /// Overrides the endpoint (used for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(
        &self,
        api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/{model}:generateContent", self.base_url, model = self.model);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderError::network(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            ProviderError::new(None, None, format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

impl Default for GeminiApiAgent {
    fn default() -> Self {
        Self::new(DEFAULT_GEMINI_MODEL)
    }
}

#[async_trait]
impl ModelClient for GeminiApiAgent {
    async fn generate(
        &self,
        credential: &Credential,
        request: &ModelRequest,
    ) -> Result<RawModelResponse, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.prompt_text.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.response_schema.clone(),
            },
        };

        self.send_request(credential.expose(), &body)
            .await
            .map(RawModelResponse::new)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                Some(candidates.swap_remove(0))
            }
        })
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            ProviderError::new(
                None,
                None,
                "Gemini API returned no text in the response candidates",
            )
        })
}

fn map_http_error(status: StatusCode, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorWrapper>(body) {
        Ok(wrapper) => ProviderError::new(
            Some(status.as_u16()),
            wrapper.error.status.as_deref(),
            wrapper.error.message.unwrap_or_else(|| body.to_string()),
        ),
        Err(_) => ProviderError::new(Some(status.as_u16()), None, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_structured_error() {
        let body = r#"{"error":{"code":429,"message":"You exceeded your current quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(err.status, Some(429));
        assert_eq!(err.code.as_deref(), Some("RESOURCE_EXHAUSTED"));
        assert_eq!(err.message, "You exceeded your current quota");
    }

    #[test]
    fn test_map_unstructured_error() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "upstream overloaded");
        assert_eq!(err.status, Some(503));
        assert_eq!(err.code, None);
        assert_eq!(err.message, "upstream overloaded");
    }

    #[test]
    fn test_extract_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"name\":\"Steam\"}"}]}},{"content":{"parts":[{"text":"other"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), r#"{"name":"Steam"}"#);
    }

    #[test]
    fn test_extract_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_text_response(response).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![Part { text: "hi".into() }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: serde_json::json!({"type": "OBJECT"}),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }
}
