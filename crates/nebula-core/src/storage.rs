//! Key-value persistence interface.
//!
//! Mirrors the synchronous `getItem`/`setItem`/`removeItem` substrate the
//! arcade persists credentials, histories and caches into. Values are JSON
//! strings; the store does not interpret them.

use crate::error::Result;

/// Storage key for the user-supplied credential.
pub const CREDENTIAL_KEY: &str = "nebula.credential";
/// Storage key for the alchemy combination cache.
pub const ALCHEMY_CACHE_KEY: &str = "nebula.cache.alchemy";
/// Storage key for the word-ladder step validation cache.
pub const WORD_LADDER_CACHE_KEY: &str = "nebula.cache.word_ladder";

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;
}
