//! Arena combat resolution. Every attack is a fresh model judgment.

use crate::generator::ContentGenerator;
use nebula_core::Result;
use nebula_core::content::{ArenaCombatVerdict, ArenaCreature};
use nebula_core::prompt::PromptRequest;

pub struct ArenaService {
    generator: ContentGenerator,
}

impl ArenaService {
    pub fn new(generator: ContentGenerator) -> Self {
        Self { generator }
    }

    /// Resolves the player's `action` against `creature`.
    pub async fn resolve_attack(
        &self,
        creature: &ArenaCreature,
        action: &str,
    ) -> Result<ArenaCombatVerdict> {
        let verdict: ArenaCombatVerdict = self
            .generator
            .generate_one(PromptRequest::ArenaCombat {
                creature: creature.creature.clone(),
                description: creature.description.clone(),
                difficulty_tier: creature.difficulty_tier,
                action: action.trim().to_string(),
            })
            .await?;

        tracing::debug!(
            creature = %creature.creature,
            success = verdict.success,
            damage = verdict.damage_dealt,
            "Resolved attack"
        );
        Ok(verdict)
    }
}
