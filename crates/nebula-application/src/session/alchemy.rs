use super::tracker::{SessionState, SessionTracker};
use crate::alchemy_service::{AlchemyService, CombineOutcome};
use crate::history_store::HistoryStore;
use nebula_core::content::AlchemyCombination;
use nebula_core::{ArcadeError, GameMode, History, Result};
use std::sync::Arc;

const BASE_ELEMENTS: [(&str, &str); 4] = [
    ("Water", "💧"),
    ("Fire", "🔥"),
    ("Earth", "🌍"),
    ("Air", "💨"),
];

/// Controller for the element crafting game.
///
/// Not queue-backed: every combination is a single-shot call through
/// [`AlchemyService`].
pub struct AlchemySession {
    tracker: SessionTracker,
    alchemy: Arc<AlchemyService>,
    inventory: Vec<AlchemyCombination>,
}

impl AlchemySession {
    /// Starts with the four base elements.
    pub fn new(alchemy: Arc<AlchemyService>, histories: HistoryStore) -> Self {
        let inventory = BASE_ELEMENTS
            .iter()
            .map(|(name, emoji)| AlchemyCombination {
                name: name.to_string(),
                emoji: emoji.to_string(),
            })
            .collect();
        let mut tracker = SessionTracker::new(GameMode::Alchemy, histories);
        tracker.set_state(SessionState::Playing);
        Self {
            tracker,
            alchemy,
            inventory,
        }
    }

    /// Combines two discovered elements.
    ///
    /// A result not yet in the inventory is added to it and to history,
    /// whether it came from the cache or the model.
    ///
    /// # Errors
    ///
    /// `InvalidAction` if either element has not been discovered; model
    /// errors otherwise.
    pub async fn combine(&mut self, first: &str, second: &str) -> Result<CombineOutcome> {
        self.tracker.ensure_active()?;
        for element in [first, second] {
            if self.find(element).is_none() {
                return Err(ArcadeError::invalid_action(format!(
                    "{} has not been discovered",
                    element.trim()
                )));
            }
        }

        let outcome = self
            .alchemy
            .combine(first, second)
            .await
            .map_err(|e| self.tracker.fail(e))?;
        self.tracker.set_state(SessionState::Playing);

        if self.find(&outcome.name).is_none() {
            self.inventory.push(AlchemyCombination {
                name: outcome.name.clone(),
                emoji: outcome.emoji.clone(),
            });
            self.tracker.complete(&outcome.name);
            self.tracker.set_state(SessionState::Playing);
        }

        Ok(outcome)
    }

    /// Discovered elements in discovery order.
    pub fn inventory(&self) -> &[AlchemyCombination] {
        &self.inventory
    }

    pub fn state(&self) -> &SessionState {
        self.tracker.state()
    }

    /// Snapshot of the answers recorded for this mode.
    pub fn history(&self) -> History {
        self.tracker.history()
    }

    fn find(&self, name: &str) -> Option<&AlchemyCombination> {
        let wanted = History::normalize(name);
        self.inventory
            .iter()
            .find(|element| History::normalize(&element.name) == wanted)
    }
}
