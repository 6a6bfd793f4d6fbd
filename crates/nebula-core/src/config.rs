//! Configuration models.
//!
//! `ArcadeConfig` lives in `config.toml`; `SecretConfig` in `secret.json`.
//! Every field has a default so a partial or missing file is valid.

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ArcadeConfig {
    pub model: ModelConfig,
    pub retry: RetryConfig,
    pub queue: QueueConfig,
    pub prompt: PromptConfig,
    pub cache: CacheConfig,
    /// Forces the content locale instead of detecting it.
    pub locale: Option<Locale>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub model_name: String,
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

/// Backoff for transient model failures.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each later one.
    pub initial_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2000,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct QueueConfig {
    /// Items requested per prefetch round trip.
    pub batch_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { batch_size: 5 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    /// How many recent history entries are sent back as exclusions.
    pub exclusion_limit: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            exclusion_limit: 20,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries per content cache.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 500 }
    }
}

/// Root structure of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: ArcadeConfig = toml::from_str("").unwrap();
        assert_eq!(config, ArcadeConfig::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_delay_ms, 2000);
        assert_eq!(config.queue.batch_size, 5);
        assert_eq!(config.cache.capacity, 500);
        assert_eq!(config.model.model_name, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_partial_override() {
        let config: ArcadeConfig = toml::from_str(
            r#"
            locale = "en"

            [queue]
            batch_size = 3

            [prompt]
            exclusion_limit = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.locale, Some(Locale::English));
        assert_eq!(config.queue.batch_size, 3);
        assert_eq!(config.prompt.exclusion_limit, 15);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_secret_config_parses() {
        let secrets: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "abc"}}"#).unwrap();
        let gemini = secrets.gemini.unwrap();
        assert_eq!(gemini.api_key, "abc");
    }
}
