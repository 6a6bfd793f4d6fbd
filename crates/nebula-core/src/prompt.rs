//! Prompt values handed from the prompt builder to the transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::locale::Locale;
use crate::mode::GameMode;

/// An immutable, fully rendered model request.
///
/// Built fresh for every call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSpec {
    /// Compact natural-language instruction.
    pub instruction_text: String,
    /// Structured output schema the model must follow.
    pub response_shape: Value,
    /// Language the content is generated in.
    pub locale: Locale,
}

/// What a caller wants generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    /// A batch of `count` fresh items for a batched game mode.
    Batch { mode: GameMode, count: usize },
    /// The element produced by combining two alchemy elements.
    AlchemyCombine { first: String, second: String },
    /// Judgment of one word-ladder step.
    WordLadderStep {
        current: String,
        candidate: String,
        target: String,
    },
    /// Outcome of a player's action against an arena creature.
    ArenaCombat {
        creature: String,
        description: String,
        difficulty_tier: u8,
        action: String,
    },
}

impl PromptRequest {
    /// The game mode the request belongs to.
    pub fn mode(&self) -> GameMode {
        match self {
            PromptRequest::Batch { mode, .. } => *mode,
            PromptRequest::AlchemyCombine { .. } => GameMode::Alchemy,
            PromptRequest::WordLadderStep { .. } => GameMode::WordLadder,
            PromptRequest::ArenaCombat { .. } => GameMode::Arena,
        }
    }
}
