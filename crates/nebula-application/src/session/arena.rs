use super::tracker::{SessionState, SessionTracker};
use crate::arena_service::ArenaService;
use crate::history_store::HistoryStore;
use crate::prefetch::PrefetchQueue;
use nebula_core::content::{ArenaCombatVerdict, ArenaCreature, ContentItem};
use nebula_core::{ArcadeError, History, Result};
use std::sync::Arc;

pub const PLAYER_MAX_HEALTH: u32 = 100;
const CREATURE_HEALTH_PER_TIER: u32 = 30;
const SCORE_PER_TIER: u32 = 100;

/// Result of one attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    pub verdict: ArenaCombatVerdict,
    pub creature_defeated: bool,
    pub player_defeated: bool,
}

/// Controller for arena fights.
///
/// Successful attacks subtract `damage_dealt` from the creature. Every
/// attack costs the player half of the missing survival chance, so a
/// verdict with `survival_chance: 100` is free. Defeated creatures are
/// recorded in history and score `difficulty_tier * 100`.
pub struct ArenaSession {
    tracker: SessionTracker,
    queue: Arc<PrefetchQueue>,
    arena: Arc<ArenaService>,
    creature: Option<ArenaCreature>,
    creature_health: u32,
    player_health: u32,
    score: u32,
}

impl ArenaSession {
    pub fn new(queue: Arc<PrefetchQueue>, arena: Arc<ArenaService>, histories: HistoryStore) -> Self {
        Self {
            tracker: SessionTracker::new(queue.mode(), histories),
            queue,
            arena,
            creature: None,
            creature_health: 0,
            player_health: PLAYER_MAX_HEALTH,
            score: 0,
        }
    }

    /// Brings in the next opponent. Player health and score carry over.
    pub async fn start(&mut self) -> Result<Option<&ArenaCreature>> {
        if self.player_health == 0 {
            return Err(ArcadeError::invalid_action("the player has been defeated"));
        }
        self.creature = None;

        let creature = match self.tracker.draw(&self.queue).await? {
            Some(ContentItem::ArenaCreature(creature)) => creature,
            Some(other) => {
                return Err(self.tracker.fail(ArcadeError::internal(format!(
                    "{} item served to an arena session",
                    other.mode()
                ))));
            }
            None => return Ok(None),
        };
        self.creature_health = u32::from(creature.difficulty_tier.max(1)) * CREATURE_HEALTH_PER_TIER;
        let creature = self.creature.insert(creature);
        Ok(Some(&*creature))
    }

    /// Attacks the current creature with a free-text action.
    pub async fn attack(&mut self, action: &str) -> Result<AttackOutcome> {
        self.tracker.ensure_active()?;
        let creature = match &self.creature {
            Some(creature)
                if self.creature_health > 0
                    && self.player_health > 0
                    && !matches!(self.tracker.state(), SessionState::RoundComplete) =>
            {
                creature.clone()
            }
            _ => return Err(ArcadeError::invalid_action("no fight in progress")),
        };

        let verdict = self
            .arena
            .resolve_attack(&creature, action)
            .await
            .map_err(|e| self.tracker.fail(e))?;
        self.tracker.set_state(SessionState::Playing);

        if verdict.success {
            self.creature_health = self.creature_health.saturating_sub(verdict.damage_dealt);
        }
        let counter = u32::from(100 - verdict.survival_chance.min(100)) / 2;
        self.player_health = self.player_health.saturating_sub(counter);

        let creature_defeated = self.creature_health == 0;
        let player_defeated = !creature_defeated && self.player_health == 0;

        if creature_defeated {
            self.score += u32::from(creature.difficulty_tier) * SCORE_PER_TIER;
            self.tracker.complete(&creature.creature);
            tracing::info!(creature = %creature.creature, score = self.score, "Creature defeated");
        } else if player_defeated {
            self.tracker.set_state(SessionState::GameOver);
        }

        Ok(AttackOutcome {
            verdict,
            creature_defeated,
            player_defeated,
        })
    }

    /// Resets health and score for a new run.
    pub fn restart(&mut self) {
        self.creature = None;
        self.creature_health = 0;
        self.player_health = PLAYER_MAX_HEALTH;
        self.score = 0;
        if !self.tracker.state().is_terminal() {
            self.tracker.set_state(SessionState::Idle);
        }
    }

    pub fn creature(&self) -> Option<&ArenaCreature> {
        self.creature.as_ref()
    }

    pub fn creature_health(&self) -> u32 {
        self.creature_health
    }

    pub fn player_health(&self) -> u32 {
        self.player_health
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> &SessionState {
        self.tracker.state()
    }

    /// Snapshot of the answers recorded for this mode.
    pub fn history(&self) -> History {
        self.tracker.history()
    }
}
