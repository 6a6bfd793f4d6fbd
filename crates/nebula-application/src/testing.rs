//! Test doubles shared by the unit tests of this crate.

use crate::generator::ContentGenerator;
use async_trait::async_trait;
use nebula_core::model::RawModelResponse;
use nebula_core::prompt::PromptSpec;
use nebula_core::storage::KeyValueStore;
use nebula_core::{ArcadeError, Locale, Result};
use nebula_infrastructure::MemoryStore;
use nebula_interaction::{PromptBuilder, Transport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays scripted outcomes in order and records every prompt.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<PromptSpec>>,
    delay: Duration,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Result<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<PromptSpec> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, spec: &PromptSpec) -> Result<RawModelResponse> {
        self.prompts.lock().unwrap().push(spec.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ArcadeError::internal("transport script exhausted")))
            .map(RawModelResponse::new)
    }
}

pub(crate) fn generator(transport: Arc<ScriptedTransport>) -> ContentGenerator {
    ContentGenerator::new(Arc::new(PromptBuilder::default()), transport)
        .with_locale(Some(Locale::English))
}

pub(crate) fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

/// A JSON array of cipher puzzles with the given answers.
pub(crate) fn cipher_batch(words: &[&str]) -> String {
    let items: Vec<_> = words
        .iter()
        .map(|word| {
            serde_json::json!({
                "original": word,
                "encrypted": word.chars().rev().collect::<String>(),
                "rule": "Reversed",
                "category": "Fruit"
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}
