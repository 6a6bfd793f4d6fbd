//! Application layer for Nebula Arcade.
//!
//! Coordinates the prompt/transport/decoder pipeline with the prefetch
//! queues, content caches and per-mode histories, and exposes one session
//! controller per game.

pub mod alchemy_service;
pub mod arcade;
pub mod arena_service;
pub mod content_cache;
pub mod generator;
pub mod history_store;
pub mod prefetch;
pub mod session;
pub mod word_ladder_service;

#[cfg(test)]
pub(crate) mod testing;

pub use alchemy_service::{AlchemyService, CombineOutcome};
pub use arcade::Arcade;
pub use arena_service::ArenaService;
pub use content_cache::{ContentCache, ordered_key, symmetric_key};
pub use generator::ContentGenerator;
pub use history_store::HistoryStore;
pub use prefetch::PrefetchQueue;
pub use word_ladder_service::WordLadderService;
