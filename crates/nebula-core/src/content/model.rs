//! Content items produced by the model, one struct per game mode.
//!
//! Field names follow the camelCase JSON the model is asked to emit.

use serde::{Deserialize, Serialize};

use crate::mode::GameMode;

/// Result of combining two alchemy elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlchemyCombination {
    pub name: String,
    pub emoji: String,
}

/// A phrase encoded as a row of emojis, with five escalating hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiPuzzle {
    pub emojis: String,
    pub answer: String,
    pub hints: [String; 5],
}

/// A two-sided moral dilemma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dilemma {
    pub title: String,
    pub description: String,
    pub option_a: String,
    pub option_b: String,
    pub consequence_a: String,
    pub consequence_b: String,
}

/// Start and end words of a word ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordLadderEndpoints {
    pub start_word: String,
    pub end_word: String,
    pub start_emoji: String,
    pub end_emoji: String,
}

/// The model's judgment of one proposed ladder step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordLadderStepVerdict {
    pub is_valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// How close the candidate is to the end word, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity: Option<u8>,
}

/// An encrypted word with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherPuzzle {
    pub original: String,
    pub encrypted: String,
    pub rule: String,
    pub category: String,
}

/// An opponent in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaCreature {
    pub creature: String,
    pub emoji: String,
    pub description: String,
    /// 1 (harmless) to 5 (legendary).
    pub difficulty_tier: u8,
}

/// Outcome of one attack in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaCombatVerdict {
    pub success: bool,
    pub commentary: String,
    /// Player's chance of surviving the counter-attack, 0-100.
    pub survival_chance: u8,
    pub damage_dealt: u32,
}

/// One unit of generated content, tagged by variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentItem {
    AlchemyCombination(AlchemyCombination),
    EmojiPuzzle(EmojiPuzzle),
    Dilemma(Dilemma),
    WordLadderEndpoints(WordLadderEndpoints),
    WordLadderStepVerdict(WordLadderStepVerdict),
    CipherPuzzle(CipherPuzzle),
    ArenaCreature(ArenaCreature),
    ArenaCombatVerdict(ArenaCombatVerdict),
}

impl ContentItem {
    /// The answer identifier recorded in history for this item.
    ///
    /// Verdicts are per-call judgments and have no identity.
    pub fn identity(&self) -> Option<String> {
        match self {
            ContentItem::AlchemyCombination(item) => Some(item.name.clone()),
            ContentItem::EmojiPuzzle(item) => Some(item.answer.clone()),
            ContentItem::Dilemma(item) => Some(item.title.clone()),
            ContentItem::WordLadderEndpoints(item) => {
                Some(format!("{}->{}", item.start_word, item.end_word))
            }
            ContentItem::CipherPuzzle(item) => Some(item.original.clone()),
            ContentItem::ArenaCreature(item) => Some(item.creature.clone()),
            ContentItem::WordLadderStepVerdict(_) | ContentItem::ArenaCombatVerdict(_) => None,
        }
    }

    /// The game mode this item belongs to.
    pub fn mode(&self) -> GameMode {
        match self {
            ContentItem::AlchemyCombination(_) => GameMode::Alchemy,
            ContentItem::EmojiPuzzle(_) => GameMode::EmojiRiddle,
            ContentItem::Dilemma(_) => GameMode::Dilemma,
            ContentItem::WordLadderEndpoints(_) | ContentItem::WordLadderStepVerdict(_) => {
                GameMode::WordLadder
            }
            ContentItem::CipherPuzzle(_) => GameMode::Cipher,
            ContentItem::ArenaCreature(_) | ContentItem::ArenaCombatVerdict(_) => GameMode::Arena,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ContentItem {
                fn from(item: $variant) -> Self {
                    ContentItem::$variant(item)
                }
            }
        )*
    };
}

impl_from_variant!(
    AlchemyCombination,
    EmojiPuzzle,
    Dilemma,
    WordLadderEndpoints,
    WordLadderStepVerdict,
    CipherPuzzle,
    ArenaCreature,
    ArenaCombatVerdict,
);
