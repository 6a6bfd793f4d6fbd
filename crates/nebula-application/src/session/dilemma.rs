use super::tracker::{SessionState, SessionTracker};
use crate::history_store::HistoryStore;
use crate::prefetch::PrefetchQueue;
use nebula_core::content::{ContentItem, Dilemma};
use nebula_core::{ArcadeError, History, Result};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    A,
    B,
}

/// Controller for moral dilemmas.
pub struct DilemmaSession {
    tracker: SessionTracker,
    queue: Arc<PrefetchQueue>,
    current: Option<Dilemma>,
}

impl DilemmaSession {
    pub fn new(queue: Arc<PrefetchQueue>, histories: HistoryStore) -> Self {
        Self {
            tracker: SessionTracker::new(queue.mode(), histories),
            queue,
            current: None,
        }
    }

    /// Loads the next dilemma; `None` when only seen titles came back.
    pub async fn start(&mut self) -> Result<Option<&Dilemma>> {
        self.current = None;

        let dilemma = match self.tracker.draw(&self.queue).await? {
            Some(ContentItem::Dilemma(dilemma)) => dilemma,
            Some(other) => {
                return Err(self.tracker.fail(ArcadeError::internal(format!(
                    "{} item served to a dilemma session",
                    other.mode()
                ))));
            }
            None => return Ok(None),
        };
        let dilemma = self.current.insert(dilemma);
        Ok(Some(&*dilemma))
    }

    /// Picks a side and returns its consequence. The dilemma's title is
    /// recorded in history.
    pub fn choose(&mut self, choice: Choice) -> Result<String> {
        self.tracker.ensure_active()?;
        let dilemma = match (&self.current, self.tracker.state()) {
            (Some(dilemma), SessionState::Playing) => dilemma,
            _ => return Err(ArcadeError::invalid_action("no dilemma awaiting a choice")),
        };

        let consequence = match choice {
            Choice::A => dilemma.consequence_a.clone(),
            Choice::B => dilemma.consequence_b.clone(),
        };
        let title = dilemma.title.clone();
        self.tracker.complete(&title);
        Ok(consequence)
    }

    pub fn current(&self) -> Option<&Dilemma> {
        self.current.as_ref()
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
    use crate::testing::{ScriptedTransport, generator, memory_store};
    use nebula_core::GameMode;

    #[tokio::test]
    async fn test_choice_returns_consequence_and_records_title() {
        let batch = serde_json::json!([{
            "title": "The Lifeboat",
            "description": "Too many passengers",
            "optionA": "Draw lots",
            "optionB": "Captain decides",
            "consequenceA": "Fair but cruel",
            "consequenceB": "Efficient but tyrannical"
        }]);
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(batch.to_string())]));
        let queue = Arc::new(PrefetchQueue::new(GameMode::Dilemma, 5, generator(transport)));
        let mut dilemmas = DilemmaSession::new(queue, HistoryStore::new(memory_store()));

        assert!(dilemmas.choose(Choice::A).is_err());

        let dilemma = dilemmas.start().await.unwrap().unwrap();
        assert_eq!(dilemma.option_b, "Captain decides");

        assert_eq!(dilemmas.choose(Choice::B).unwrap(), "Efficient but tyrannical");
        assert!(dilemmas.history().contains("the lifeboat"));
        assert_eq!(dilemmas.state(), &SessionState::RoundComplete);

        // One choice per dilemma
        assert!(dilemmas.choose(Choice::A).is_err());
    }
}
