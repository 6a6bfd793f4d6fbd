//! Word-ladder step validation.
//!
//! Validity and proximity are the model's judgment; there is no local
//! semantic rule set. Identical steps are answered from the cache.

use crate::content_cache::{ContentCache, ordered_key};
use crate::generator::ContentGenerator;
use nebula_core::Result;
use nebula_core::content::WordLadderStepVerdict;
use nebula_core::prompt::PromptRequest;

pub struct WordLadderService {
    generator: ContentGenerator,
    cache: ContentCache<WordLadderStepVerdict>,
}

impl WordLadderService {
    pub fn new(generator: ContentGenerator, cache: ContentCache<WordLadderStepVerdict>) -> Self {
        Self { generator, cache }
    }

    /// Judges moving from `current` to `candidate` on the way to `target`.
    ///
    /// Cached under `current->candidate->target`; the relation is ordered,
    /// so swapping words is a different question.
    pub async fn validate_step(
        &self,
        current: &str,
        candidate: &str,
        target: &str,
    ) -> Result<WordLadderStepVerdict> {
        let key = ordered_key(&[current, candidate, target]);

        if let Some(verdict) = self.cache.get(&key).await {
            tracing::debug!(%key, "Word ladder cache hit");
            return Ok(verdict);
        }

        let verdict: WordLadderStepVerdict = self
            .generator
            .generate_one(PromptRequest::WordLadderStep {
                current: current.trim().to_string(),
                candidate: candidate.trim().to_string(),
                target: target.trim().to_string(),
            })
            .await?;

        tracing::debug!(%key, valid = verdict.is_valid, proximity = ?verdict.proximity, "Validated step");

        if let Err(e) = self.cache.put(key, verdict.clone()).await {
            tracing::warn!(error = %e, "Failed to persist word ladder cache");
        }

        Ok(verdict)
    }

    pub fn cache(&self) -> &ContentCache<WordLadderStepVerdict> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, generator, memory_store};
    use nebula_core::storage::WORD_LADDER_CACHE_KEY;
    use std::sync::Arc;

    fn service(transport: &Arc<ScriptedTransport>) -> WordLadderService {
        WordLadderService::new(
            generator(transport.clone()),
            ContentCache::load(memory_store(), WORD_LADDER_CACHE_KEY, 500),
        )
    }

    #[tokio::test]
    async fn test_repeated_step_is_cached() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(r#"{"isValid":true,"message":"Seeds grow","emoji":"🌳","proximity":60}"#.into()),
            Ok(r#"{"isValid":false,"message":"Not a step back"}"#.into()),
        ]));
        let ladder = service(&transport);

        let verdict = ladder.validate_step("Seed", "Tree", "Forest").await.unwrap();
        assert!(verdict.is_valid);
        assert_eq!(verdict.proximity, Some(60));

        let again = ladder.validate_step(" seed", "TREE ", "forest").await.unwrap();
        assert_eq!(again, verdict);
        assert_eq!(transport.calls(), 1);

        // Reversed order is a different question
        let reversed = ladder.validate_step("Tree", "Seed", "Forest").await.unwrap();
        assert!(!reversed.is_valid);
        assert_eq!(transport.calls(), 2);
    }
}
