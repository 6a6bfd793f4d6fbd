//! Boundary to the generative model endpoint.
//!
//! The arcade only assumes "send text plus schema, receive text or a
//! structured error". Provider SDK shapes stay behind [`ModelClient`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::secret::Credential;

/// One model call as seen by a provider client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRequest {
    pub prompt_text: String,
    pub response_schema: Value,
}

/// Raw text returned by the model. May still carry code fences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModelResponse {
    pub text: String,
}

impl RawModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Error shape reported by a provider client, before classification.
///
/// `status` is the HTTP status when one was received, `code` the
/// provider's symbolic status (e.g. `RESOURCE_EXHAUSTED`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// An error with no HTTP exchange behind it (connection refused, DNS, ...).
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(None, None, message)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.code.as_deref()) {
            (Some(status), Some(code)) => write!(f, "{status} {code}: {}", self.message),
            (Some(status), None) => write!(f, "{status}: {}", self.message),
            (None, Some(code)) => write!(f, "{code}: {}", self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// A generative model endpoint.
///
/// Implementations perform exactly one request per call; retries and error
/// classification happen above this trait.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends the prompt and schema with the given credential.
    async fn generate(
        &self,
        credential: &Credential,
        request: &ModelRequest,
    ) -> Result<RawModelResponse, ProviderError>;
}
