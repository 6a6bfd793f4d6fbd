//! Explicit wiring of the orchestration services.

use crate::alchemy_service::AlchemyService;
use crate::arena_service::ArenaService;
use crate::content_cache::ContentCache;
use crate::generator::ContentGenerator;
use crate::history_store::HistoryStore;
use crate::prefetch::PrefetchQueue;
use crate::session::{
    AlchemySession, ArenaSession, DilemmaSession, PuzzleSession, WordLadderSession,
};
use crate::word_ladder_service::WordLadderService;
use nebula_core::config::ArcadeConfig;
use nebula_core::model::ModelClient;
use nebula_core::secret::CredentialProvider;
use nebula_core::storage::{ALCHEMY_CACHE_KEY, KeyValueStore, WORD_LADDER_CACHE_KEY};
use nebula_core::{ArcadeError, GameMode, Result};
use nebula_infrastructure::LocalEnvironment;
use nebula_interaction::{GeminiApiAgent, PromptBuilder, RetryPolicy, RetryingTransport, Transport};
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Owns one prefetch queue per batched mode, the shared caches and the
/// single-shot services, and hands out session controllers.
pub struct Arcade {
    histories: HistoryStore,
    queues: HashMap<GameMode, Arc<PrefetchQueue>>,
    alchemy: Arc<AlchemyService>,
    word_ladder: Arc<WordLadderService>,
    arena: Arc<ArenaService>,
}

impl Arcade {
    /// Wires the arcade on top of an existing transport.
    pub fn new(
        config: &ArcadeConfig,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let prompts = Arc::new(PromptBuilder::from_config(&config.prompt));
        let generator = ContentGenerator::new(prompts, transport).with_locale(config.locale);

        let queues: HashMap<_, _> = GameMode::iter()
            .filter(|mode| mode.is_batched())
            .map(|mode| {
                let queue = PrefetchQueue::new(mode, config.queue.batch_size, generator.clone());
                (mode, Arc::new(queue))
            })
            .collect();

        let alchemy = AlchemyService::new(
            generator.clone(),
            ContentCache::load(store.clone(), ALCHEMY_CACHE_KEY, config.cache.capacity),
        );
        let word_ladder = WordLadderService::new(
            generator.clone(),
            ContentCache::load(store.clone(), WORD_LADDER_CACHE_KEY, config.cache.capacity),
        );

        tracing::debug!(
            batch_size = config.queue.batch_size,
            cache_capacity = config.cache.capacity,
            locale = ?config.locale,
            "Arcade wired"
        );

        Self {
            histories: HistoryStore::new(store),
            queues,
            alchemy: Arc::new(alchemy),
            word_ladder: Arc::new(word_ladder),
            arena: Arc::new(ArenaService::new(generator)),
        }
    }

    /// Wires the arcade around a model client, adding retry/backoff per the
    /// `[retry]` config section.
    pub fn with_model_client(
        config: &ArcadeConfig,
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn ModelClient>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let transport = RetryingTransport::new(client, credentials)
            .with_policy(RetryPolicy::from(&config.retry));
        Self::new(config, store, Arc::new(transport))
    }

    /// Wires the arcade from the on-disk environment using the Gemini client.
    pub fn from_environment(env: &LocalEnvironment) -> Self {
        let client = GeminiApiAgent::from_config(&env.config.model);
        Self::with_model_client(
            &env.config,
            env.store.clone(),
            Arc::new(client),
            env.credentials.clone(),
        )
    }

    /// The prefetch queue of a batched mode.
    pub fn queue(&self, mode: GameMode) -> Option<Arc<PrefetchQueue>> {
        self.queues.get(&mode).cloned()
    }

    pub fn histories(&self) -> &HistoryStore {
        &self.histories
    }

    pub fn alchemy(&self) -> &Arc<AlchemyService> {
        &self.alchemy
    }

    pub fn word_ladder(&self) -> &Arc<WordLadderService> {
        &self.word_ladder
    }

    /// Session for emoji riddles or ciphers.
    pub fn puzzle_session(&self, mode: GameMode) -> Result<PuzzleSession> {
        PuzzleSession::new(self.batched(mode)?, self.histories.clone())
    }

    pub fn dilemma_session(&self) -> Result<DilemmaSession> {
        Ok(DilemmaSession::new(
            self.batched(GameMode::Dilemma)?,
            self.histories.clone(),
        ))
    }

    pub fn word_ladder_session(&self) -> Result<WordLadderSession> {
        Ok(WordLadderSession::new(
            self.batched(GameMode::WordLadder)?,
            self.word_ladder.clone(),
            self.histories.clone(),
        ))
    }

    pub fn arena_session(&self) -> Result<ArenaSession> {
        Ok(ArenaSession::new(
            self.batched(GameMode::Arena)?,
            self.arena.clone(),
            self.histories.clone(),
        ))
    }

    pub fn alchemy_session(&self) -> AlchemySession {
        AlchemySession::new(self.alchemy.clone(), self.histories.clone())
    }

    fn batched(&self, mode: GameMode) -> Result<Arc<PrefetchQueue>> {
        self.queue(mode)
            .ok_or_else(|| ArcadeError::invalid_action(format!("{mode} has no prefetch queue")))
    }
}
