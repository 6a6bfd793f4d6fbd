//! Turns raw model text into typed content.

use nebula_core::content::{
    AlchemyCombination, ArenaCreature, CipherPuzzle, ContentItem, Dilemma, EmojiPuzzle,
    WordLadderEndpoints,
};
use nebula_core::model::RawModelResponse;
use nebula_core::{ArcadeError, GameMode, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Removes a surrounding markdown code fence, then trims.
///
/// Only the positions matter: a leading "```" (with an optional language tag
/// up to the end of that line) and a trailing "```". Text without fences is
/// returned trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Skip the language tag ("json", "JSON", ...) on the opening line
        text = match rest.find('\n') {
            Some(newline) if rest[..newline].trim().chars().all(char::is_alphanumeric) => {
                &rest[newline + 1..]
            }
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }

    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Decodes raw model text into `T`.
///
/// Missing required fields, wrong types and invalid JSON all yield
/// [`ArcadeError::MalformedResponse`].
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(ArcadeError::malformed("empty response"));
    }
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!(error = %e, body, "Failed to decode model response");
        ArcadeError::malformed(format!("{} (expected {})", e, short_type_name::<T>()))
    })
}

/// Decodes a batch of `T`.
///
/// Accepts a bare JSON array or an object holding the array under `items`.
pub fn decode_list<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Batch<T> {
        Bare(Vec<T>),
        Wrapped { items: Vec<T> },
    }

    let batch: Batch<T> = decode(raw)?;
    Ok(match batch {
        Batch::Bare(items) | Batch::Wrapped { items } => items,
    })
}

/// Decodes a prefetch batch for `mode` into content items.
pub fn decode_batch(mode: GameMode, response: &RawModelResponse) -> Result<Vec<ContentItem>> {
    let raw = response.text.as_str();
    let items = match mode {
        GameMode::EmojiRiddle => into_items(decode_list::<EmojiPuzzle>(raw)?),
        GameMode::Dilemma => into_items(decode_list::<Dilemma>(raw)?),
        GameMode::WordLadder => into_items(decode_list::<WordLadderEndpoints>(raw)?),
        GameMode::Cipher => into_items(decode_list::<CipherPuzzle>(raw)?),
        GameMode::Arena => into_items(decode_list::<ArenaCreature>(raw)?),
        GameMode::Alchemy => into_items(decode_list::<AlchemyCombination>(raw)?),
    };
    Ok(items)
}

/// Decodes a single-shot response of the variant `T`.
pub fn decode_item<T>(response: &RawModelResponse) -> Result<T>
where
    T: DeserializeOwned + Into<ContentItem>,
{
    decode(&response.text)
}

fn into_items<T: Into<ContentItem>>(items: Vec<T>) -> Vec<ContentItem> {
    items.into_iter().map(Into::into).collect()
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
