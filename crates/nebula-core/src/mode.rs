//! Game modes offered by the arcade.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// One mini-game of the arcade.
///
/// The string form (`snake_case`) is used in storage keys, so renaming a
/// variant orphans its persisted history.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameMode {
    /// Combine elements into new ones.
    Alchemy,
    /// Guess the phrase behind a row of emojis.
    EmojiRiddle,
    /// Pick a side in a moral dilemma.
    Dilemma,
    /// Walk from a start word to an end word through related words.
    WordLadder,
    /// Decode an encrypted word.
    Cipher,
    /// Defeat creatures by describing actions.
    Arena,
}

impl GameMode {
    /// Returns true for modes whose content is served through a prefetch queue.
    pub fn is_batched(self) -> bool {
        !matches!(self, GameMode::Alchemy)
    }

    /// Storage key for this mode's answer history.
    pub fn history_key(self) -> String {
        format!("nebula.history.{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_history_keys_are_distinct() {
        let keys: std::collections::HashSet<String> =
            GameMode::iter().map(GameMode::history_key).collect();
        assert_eq!(keys.len(), GameMode::iter().count());
        assert_eq!(GameMode::EmojiRiddle.history_key(), "nebula.history.emoji_riddle");
    }

    #[test]
    fn test_string_round_trip() {
        for mode in GameMode::iter() {
            let name = mode.to_string();
            assert_eq!(GameMode::from_str(&name).unwrap(), mode);
        }
    }

    #[test]
    fn test_only_alchemy_is_unbatched() {
        let unbatched: Vec<_> = GameMode::iter().filter(|m| !m.is_batched()).collect();
        assert_eq!(unbatched, vec![GameMode::Alchemy]);
    }
}
