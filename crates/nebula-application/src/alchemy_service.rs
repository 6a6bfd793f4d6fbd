//! Element combination with a commutative, persistent cache.

use crate::content_cache::{ContentCache, symmetric_key};
use crate::generator::ContentGenerator;
use nebula_core::Result;
use nebula_core::content::AlchemyCombination;
use nebula_core::prompt::PromptRequest;
use serde::{Deserialize, Serialize};

/// Result of one combine action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineOutcome {
    pub name: String,
    pub emoji: String,
    /// True only when the result came fresh from the model.
    pub is_new: bool,
}

impl CombineOutcome {
    fn from_combination(combination: AlchemyCombination, is_new: bool) -> Self {
        Self {
            name: combination.name,
            emoji: combination.emoji,
            is_new,
        }
    }
}

/// Combines two elements, consulting the cache before the model.
pub struct AlchemyService {
    generator: ContentGenerator,
    cache: ContentCache<AlchemyCombination>,
}

impl AlchemyService {
    pub fn new(generator: ContentGenerator, cache: ContentCache<AlchemyCombination>) -> Self {
        Self { generator, cache }
    }

    /// Combines `first` and `second`.
    ///
    /// `combine(a, b)` and `combine(b, a)` share one cache entry. A cache
    /// write failure is logged and does not fail the combination.
    pub async fn combine(&self, first: &str, second: &str) -> Result<CombineOutcome> {
        let key = symmetric_key(first, second);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(%key, result = %cached.name, "Alchemy cache hit");
            return Ok(CombineOutcome::from_combination(cached, false));
        }

        let combination: AlchemyCombination = self
            .generator
            .generate_one(PromptRequest::AlchemyCombine {
                first: first.trim().to_string(),
                second: second.trim().to_string(),
            })
            .await?;

        tracing::info!(%key, result = %combination.name, "New alchemy combination");

        if let Err(e) = self.cache.put(key, combination.clone()).await {
            tracing::warn!(error = %e, "Failed to persist alchemy cache");
        }

        Ok(CombineOutcome::from_combination(combination, true))
    }

    pub fn cache(&self) -> &ContentCache<AlchemyCombination> {
        &self.cache
    }
}
