//! Generated content domain.

pub mod model;

pub use model::{
    AlchemyCombination, ArenaCombatVerdict, ArenaCreature, CipherPuzzle, ContentItem, Dilemma,
    EmojiPuzzle, WordLadderEndpoints, WordLadderStepVerdict,
};
