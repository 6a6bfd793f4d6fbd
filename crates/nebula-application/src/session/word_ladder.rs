use super::tracker::{SessionState, SessionTracker};
use crate::history_store::HistoryStore;
use crate::prefetch::PrefetchQueue;
use crate::word_ladder_service::WordLadderService;
use nebula_core::content::{ContentItem, WordLadderEndpoints, WordLadderStepVerdict};
use nebula_core::{ArcadeError, History, Result};
use std::sync::Arc;

/// Result of one proposed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub verdict: WordLadderStepVerdict,
    /// True when this step reached the end word.
    pub completed: bool,
}

/// Controller for word ladders.
///
/// The path starts at the start word; every valid step is appended. The
/// ladder is complete once a valid step lands on the end word, at which
/// point `start->end` is recorded in history.
pub struct WordLadderSession {
    tracker: SessionTracker,
    queue: Arc<PrefetchQueue>,
    ladder: Arc<WordLadderService>,
    endpoints: Option<WordLadderEndpoints>,
    path: Vec<String>,
}

impl WordLadderSession {
    pub fn new(
        queue: Arc<PrefetchQueue>,
        ladder: Arc<WordLadderService>,
        histories: HistoryStore,
    ) -> Self {
        Self {
            tracker: SessionTracker::new(queue.mode(), histories),
            queue,
            ladder,
            endpoints: None,
            path: Vec::new(),
        }
    }

    /// Loads the next pair of endpoints.
    pub async fn start(&mut self) -> Result<Option<&WordLadderEndpoints>> {
        self.endpoints = None;
        self.path.clear();

        let endpoints = match self.tracker.draw(&self.queue).await? {
            Some(ContentItem::WordLadderEndpoints(endpoints)) => endpoints,
            Some(other) => {
                return Err(self.tracker.fail(ArcadeError::internal(format!(
                    "{} item served to a word ladder session",
                    other.mode()
                ))));
            }
            None => return Ok(None),
        };
        self.path.push(endpoints.start_word.clone());
        let endpoints = self.endpoints.insert(endpoints);
        Ok(Some(&*endpoints))
    }

    /// Proposes `candidate` as the next word after the end of the path.
    pub async fn submit_step(&mut self, candidate: &str) -> Result<StepOutcome> {
        self.tracker.ensure_active()?;
        let (current, end_word, identity) = match (&self.endpoints, self.path.last()) {
            (Some(endpoints), Some(current))
                if self.tracker.state() != &SessionState::RoundComplete =>
            {
                (
                    current.clone(),
                    endpoints.end_word.clone(),
                    format!("{}->{}", endpoints.start_word, endpoints.end_word),
                )
            }
            _ => return Err(ArcadeError::invalid_action("no ladder in progress")),
        };
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(ArcadeError::invalid_action("empty step"));
        }

        let verdict = self
            .ladder
            .validate_step(&current, candidate, &end_word)
            .await
            .map_err(|e| self.tracker.fail(e))?;
        self.tracker.set_state(SessionState::Playing);

        let mut completed = false;
        if verdict.is_valid {
            self.path.push(candidate.to_string());
            if History::normalize(candidate) == History::normalize(&end_word) {
                completed = true;
                self.tracker.complete(&identity);
            }
        }

        Ok(StepOutcome { verdict, completed })
    }

    pub fn endpoints(&self) -> Option<&WordLadderEndpoints> {
        self.endpoints.as_ref()
    }

    /// Words visited so far, start word first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn state(&self) -> &SessionState {
        self.tracker.state()
    }

    /// Snapshot of the answers recorded for this mode.
    pub fn history(&self) -> History {
        self.tracker.history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_cache::ContentCache;
    use crate::testing::{ScriptedTransport, generator, memory_store};
    use nebula_core::GameMode;
    use nebula_core::storage::WORD_LADDER_CACHE_KEY;

    #[tokio::test]
    async fn test_ladder_completes_on_end_word() {
        let endpoints = serde_json::json!([{
            "startWord": "Seed",
            "endWord": "Forest",
            "startEmoji": "🌱",
            "endEmoji": "🌲"
        }]);
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(endpoints.to_string()),
            Ok(r#"{"isValid":false,"message":"No link"}"#.into()),
            Ok(r#"{"isValid":true,"message":"Seeds grow","emoji":"🌳","proximity":70}"#.into()),
            Ok(r#"{"isValid":true,"message":"Many trees","emoji":"🌲","proximity":100}"#.into()),
        ]));
        let store = memory_store();
        let ladder = Arc::new(WordLadderService::new(
            generator(transport.clone()),
            ContentCache::load(store.clone(), WORD_LADDER_CACHE_KEY, 500),
        ));
        let queue = Arc::new(PrefetchQueue::new(GameMode::WordLadder, 5, generator(transport)));
        let mut session = WordLadderSession::new(queue, ladder, HistoryStore::new(store));

        let endpoints = session.start().await.unwrap().unwrap();
        assert_eq!(endpoints.end_word, "Forest");
        assert_eq!(session.path(), ["Seed"]);

        let rejected = session.submit_step("Car").await.unwrap();
        assert!(!rejected.verdict.is_valid);
        assert_eq!(session.path(), ["Seed"]);

        let step = session.submit_step("Tree").await.unwrap();
        assert!(!step.completed);
        assert_eq!(step.verdict.proximity, Some(70));

        let last = session.submit_step(" forest ").await.unwrap();
        assert!(last.completed);
        assert_eq!(session.path(), ["Seed", "Tree", "forest"]);
        assert_eq!(session.state(), &SessionState::RoundComplete);
        assert!(session.history().contains("Seed->Forest"));

        assert!(session.submit_step("Jungle").await.is_err());
    }
}
