//! Game session controllers.
//!
//! Controllers are the only layer that turns errors into degraded states:
//! a quota error halts the session for good, anything else is shown and may
//! be retried.

mod alchemy;
mod arena;
mod dilemma;
mod puzzle;
mod tracker;
mod word_ladder;

pub use alchemy::AlchemySession;
pub use arena::{ArenaSession, AttackOutcome, PLAYER_MAX_HEALTH};
pub use dilemma::{Choice, DilemmaSession};
pub use puzzle::{GuessOutcome, Puzzle, PuzzleSession};
pub use tracker::SessionState;
pub use word_ladder::{StepOutcome, WordLadderSession};
