//! Per-mode answer history persisted in the key-value store.

use nebula_core::storage::KeyValueStore;
use nebula_core::{GameMode, History, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Loads and saves [`History`] under `nebula.history.<mode>`.
///
/// Each history is a JSON array of strings. Clones share one in-memory
/// history per mode, so every session of a mode appends to the same list
/// and a write never replaces entries recorded by another session.
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    loaded: Arc<Mutex<HashMap<GameMode, History>>>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            loaded: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Snapshot of the history of `mode`.
    ///
    /// The first access reads the store; a missing or unreadable entry
    /// yields an empty history.
    pub fn load(&self, mode: GameMode) -> History {
        let mut loaded = self.lock_loaded();
        self.entry(&mut loaded, mode).clone()
    }

    /// Appends `identifier` to the history of `mode` and persists it when it
    /// was new.
    ///
    /// # Returns
    ///
    /// `true` if the identifier was not seen before.
    ///
    /// # Errors
    ///
    /// A failed write is returned; the entry stays recorded in memory.
    pub fn record(&self, mode: GameMode, identifier: &str) -> Result<bool> {
        let mut loaded = self.lock_loaded();
        let history = self.entry(&mut loaded, mode);
        if !history.record(identifier) {
            return Ok(false);
        }
        tracing::debug!(%mode, identifier, total = history.len(), "Recorded answer");
        let raw = serde_json::to_string(history.entries())?;
        self.store.set_item(&mode.history_key(), &raw)?;
        Ok(true)
    }

    pub fn clear(&self, mode: GameMode) -> Result<()> {
        let mut loaded = self.lock_loaded();
        loaded.insert(mode, History::new());
        self.store.remove_item(&mode.history_key())
    }

    fn entry<'a>(
        &self,
        loaded: &'a mut HashMap<GameMode, History>,
        mode: GameMode,
    ) -> &'a mut History {
        loaded.entry(mode).or_insert_with(|| self.read(mode))
    }

    fn read(&self, mode: GameMode) -> History {
        match self.store.get_item(&mode.history_key()) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(%mode, error = %e, "Discarding unreadable history");
                History::new()
            }),
            None => History::new(),
        }
    }

    fn lock_loaded(&self) -> MutexGuard<'_, HashMap<GameMode, History>> {
        self.loaded.lock().unwrap_or_else(|e| e.into_inner())
    }
}
