//! Prompt → transport → decoder pipeline shared by the queue and the
//! single-shot services.

use nebula_core::content::ContentItem;
use nebula_core::prompt::PromptRequest;
use nebula_core::{GameMode, Locale, Result};
use nebula_interaction::{PromptBuilder, Transport, decode_batch, decode_item};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Runs one model round trip and decodes the result.
#[derive(Clone)]
pub struct ContentGenerator {
    prompts: Arc<PromptBuilder>,
    transport: Arc<dyn Transport>,
    locale: Option<Locale>,
}

impl ContentGenerator {
    pub fn new(prompts: Arc<PromptBuilder>, transport: Arc<dyn Transport>) -> Self {
        Self {
            prompts,
            transport,
            locale: None,
        }
    }

    /// Pins the content locale instead of detecting it per call.
    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    /// The locale the next call will generate content in.
    pub fn locale(&self) -> Locale {
        self.locale.unwrap_or_else(Locale::detect)
    }

    /// Generates up to `count` items for a batched mode.
    ///
    /// `exclude` is the mode's history, oldest first; the prompt builder keeps
    /// only its tail.
    pub async fn generate_batch(
        &self,
        mode: GameMode,
        count: usize,
        exclude: &[String],
    ) -> Result<Vec<ContentItem>> {
        let spec = self
            .prompts
            .build(&PromptRequest::Batch { mode, count }, self.locale(), exclude)?;
        let response = self.transport.execute(&spec).await?;
        decode_batch(mode, &response)
    }

    /// Generates one item of type `T` for a single-shot request.
    pub async fn generate_one<T>(&self, request: PromptRequest) -> Result<T>
    where
        T: DeserializeOwned + Into<ContentItem>,
    {
        let spec = self.prompts.build(&request, self.locale(), &[])?;
        let response = self.transport.execute(&spec).await?;
        decode_item(&response)
    }
}
