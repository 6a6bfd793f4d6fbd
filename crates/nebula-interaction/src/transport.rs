//! Model transport with error classification and exponential backoff.

use crate::classify::{ErrorClass, classify};
use async_trait::async_trait;
use nebula_core::config::RetryConfig;
use nebula_core::model::{ModelClient, ModelRequest, RawModelResponse};
use nebula_core::prompt::PromptSpec;
use nebula_core::secret::CredentialProvider;
use nebula_core::{ArcadeError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Executes a prompt against the model and returns its raw text.
///
/// Errors are already in the arcade taxonomy.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, spec: &PromptSpec) -> Result<RawModelResponse>;
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after each retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
        }
    }
}

/// [`Transport`] that reads the current credential on every attempt and
/// retries transient failures.
///
/// Attempt → success returns. Failure is classified: fatal errors surface
/// immediately; transient ones sleep the current delay, double it and try
/// again until `max_attempts` is reached, then fail with
/// [`ArcadeError::RetriesExhausted`].
pub struct RetryingTransport {
    client: Arc<dyn ModelClient>,
    credentials: Arc<dyn CredentialProvider>,
    policy: RetryPolicy,
}

impl RetryingTransport {
    pub fn new(client: Arc<dyn ModelClient>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            credentials,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn run(&self, request: ModelRequest) -> Result<RawModelResponse> {
        let mut delay = self.policy.initial_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let credential = self.credentials.current_credential()?;

            let error = match self.client.generate(&credential, &request).await {
                Ok(response) => {
                    tracing::debug!(attempt, chars = response.text.len(), "Model call succeeded");
                    return Ok(response);
                }
                Err(error) => error,
            };

            match classify(&error) {
                ErrorClass::Fatal(fatal) => {
                    tracing::warn!(attempt, error = %fatal, "Model call failed permanently");
                    return Err(fatal);
                }
                ErrorClass::Transient if attempt >= self.policy.max_attempts => {
                    tracing::warn!(attempt, error = %error, "Giving up after transient failures");
                    return Err(ArcadeError::RetriesExhausted {
                        attempts: attempt,
                        last_message: error.to_string(),
                    });
                }
                ErrorClass::Transient => {
                    tracing::info!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient model failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl Transport for RetryingTransport {
    async fn execute(&self, spec: &PromptSpec) -> Result<RawModelResponse> {
        let request = ModelRequest {
            prompt_text: spec.instruction_text.clone(),
            response_schema: spec.response_shape.clone(),
        };
        let span = tracing::info_span!(
            "model_request",
            request_id = %Uuid::new_v4(),
            locale = %spec.locale,
        );
        self.run(request).instrument(span).await
    }
}
