//! Batch prefetch queue for one game mode.

use crate::generator::ContentGenerator;
use nebula_core::content::ContentItem;
use nebula_core::{ArcadeError, GameMode, History, Result};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Buffers generated items so that most `next` calls are served locally.
///
/// `next` → buffer hit returns immediately. On a miss one batch is fetched,
/// filtered against the caller's history (and against itself), the first
/// survivor is returned and the rest are buffered. Only one fetch runs at a
/// time: callers arriving during a fetch wait on the gate and are then
/// served from the refilled buffer, or receive the error of the fetch they
/// waited on.
pub struct PrefetchQueue {
    mode: GameMode,
    batch_size: usize,
    generator: ContentGenerator,
    buffer: Mutex<VecDeque<ContentItem>>,
    /// Guards the fetch and holds the error of the last one, if it failed.
    fetch_gate: tokio::sync::Mutex<Option<ArcadeError>>,
    /// Number of completed fetches.
    fetches: AtomicU64,
}

impl PrefetchQueue {
    pub fn new(mode: GameMode, batch_size: usize, generator: ContentGenerator) -> Self {
        Self {
            mode,
            batch_size: batch_size.max(1),
            generator,
            buffer: Mutex::new(VecDeque::new()),
            fetch_gate: tokio::sync::Mutex::new(None),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.lock_buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every buffered item.
    pub fn clear(&self) {
        self.lock_buffer().clear();
    }

    /// Returns the next item whose identifier is not in `history`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(item))` - A fresh item, removed from the queue
    /// * `Ok(None)` - The fetched batch held only items already in `history`;
    ///   the queue is left empty and the caller decides whether to try again
    ///
    /// # Errors
    ///
    /// Model and decode errors propagate unchanged. A failed fetch admits
    /// nothing into the queue, and callers that waited on it get the same
    /// error without fetching again.
    pub async fn next(&self, history: &History) -> Result<Option<ContentItem>> {
        if let Some(item) = self.pop_fresh(history) {
            return Ok(Some(item));
        }

        let observed = self.fetches.load(Ordering::Acquire);
        let mut last_failure = self.fetch_gate.lock().await;

        // Another caller may have refilled the buffer while we waited
        if let Some(item) = self.pop_fresh(history) {
            return Ok(Some(item));
        }
        if self.fetches.load(Ordering::Acquire) != observed {
            if let Some(error) = last_failure.as_ref() {
                return Err(error.clone());
            }
        }

        let result = self
            .generator
            .generate_batch(self.mode, self.batch_size, history.entries())
            .await;
        self.fetches.fetch_add(1, Ordering::AcqRel);
        *last_failure = result.as_ref().err().cloned();
        let batch = result?;
        let fetched = batch.len();
        let mut fresh = admit(batch, history);

        tracing::info!(
            mode = %self.mode,
            fetched,
            admitted = fresh.len(),
            "Refilled prefetch queue"
        );

        let Some(first) = fresh.pop_front() else {
            tracing::warn!(mode = %self.mode, fetched, "Batch contained only seen items");
            return Ok(None);
        };

        self.lock_buffer().extend(fresh);
        Ok(Some(first))
    }

    /// Pops buffered items until one is still unseen.
    fn pop_fresh(&self, history: &History) -> Option<ContentItem> {
        let mut buffer = self.lock_buffer();
        while let Some(item) = buffer.pop_front() {
            if !is_seen(&item, history) {
                return Some(item);
            }
        }
        None
    }

    fn lock_buffer(&self) -> std::sync::MutexGuard<'_, VecDeque<ContentItem>> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn is_seen(item: &ContentItem, history: &History) -> bool {
    item.identity().is_some_and(|id| history.contains(&id))
}

/// Keeps items absent from `history`, dropping repeats within the batch.
fn admit(batch: Vec<ContentItem>, history: &History) -> VecDeque<ContentItem> {
    let mut seen = HashSet::new();
    batch
        .into_iter()
        .filter(|item| match item.identity() {
            Some(id) => !history.contains(&id) && seen.insert(History::normalize(&id)),
            None => true,
        })
        .collect()
}
