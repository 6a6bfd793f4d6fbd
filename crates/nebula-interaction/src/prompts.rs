//! Prompt construction per game mode.
//!
//! Instructions are rendered from compact minijinja templates; response
//! schemas use the uppercase type names the Gemini API expects.

use minijinja::{Environment, context};
use nebula_core::config::PromptConfig;
use nebula_core::prompt::{PromptRequest, PromptSpec};
use nebula_core::{ArcadeError, GameMode, Locale, Result};
use serde_json::{Value, json};

const EXCLUDE_PARTIAL: &str =
    "{% if exclude %} Do not reuse any of these: {{ exclude|join(\", \") }}.{% endif %}";

const TEMPLATES: &[(&str, &str)] = &[
    ("exclude", EXCLUDE_PARTIAL),
    (
        "batch_emoji_riddle",
        "Create {{ count }} emoji riddles. Each hides a well-known movie, book, song or saying \
         behind 2 to 6 emojis and comes with exactly 5 hints ordered from vague to obvious. \
         Write answers and hints in {{ language }}.{% include \"exclude\" %}",
    ),
    (
        "batch_dilemma",
        "Create {{ count }} short moral dilemmas with two defensible options and the \
         consequence of each. Write in {{ language }}.{% include \"exclude\" %}",
    ),
    (
        "batch_word_ladder",
        "Create {{ count }} word ladder challenges: a start word and an end word that are \
         conceptually distant but connectable through a few associations, each with one \
         emoji. Use single {{ language }} words.{% include \"exclude\" %}",
    ),
    (
        "batch_cipher",
        "Create {{ count }} cipher puzzles. Pick a common {{ language }} word, encrypt it \
         with a simple rule (letter shift, reversal, vowel swap), and give the rule and the \
         word's category.{% include \"exclude\" %}",
    ),
    (
        "batch_arena",
        "Create {{ count }} fantasy arena creatures with an emoji, a one-sentence \
         description and a difficulty tier from 1 to 5. Write in {{ language }}.\
         {% include \"exclude\" %}",
    ),
    (
        "alchemy_combine",
        "In an element crafting game, combine \"{{ first }}\" and \"{{ second }}\". Answer \
         with the single most logical resulting element and one emoji. Name it in \
         {{ language }}.",
    ),
    (
        "word_ladder_step",
        "Word ladder from \"{{ current }}\" towards \"{{ target }}\". The player proposes \
         \"{{ candidate }}\" as the next step. Judge whether it has a clear semantic link to \
         \"{{ current }}\", explain briefly in {{ language }}, and if valid give an emoji and \
         its proximity to \"{{ target }}\" from 0 to 100.",
    ),
    (
        "arena_combat",
        "Arena fight against {{ creature }} ({{ description }}, difficulty {{ tier }} of 5). \
         The player does: \"{{ action }}\". Decide if it works, narrate it in one or two \
         {{ language }} sentences, and give the damage dealt and the player's survival chance \
         from 0 to 100.",
    ),
];

/// Renders [`PromptRequest`]s into [`PromptSpec`]s.
pub struct PromptBuilder {
    env: Environment<'static>,
    exclusion_limit: usize,
}

impl PromptBuilder {
    pub fn new(exclusion_limit: usize) -> Self {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            if let Err(e) = env.add_template(name, source) {
                tracing::error!(template = name, error = %e, "Invalid prompt template");
            }
        }
        Self {
            env,
            exclusion_limit,
        }
    }

    pub fn from_config(config: &PromptConfig) -> Self {
        Self::new(config.exclusion_limit)
    }

    /// Builds the prompt for `request` in `locale`.
    ///
    /// Only the most recent `exclusion_limit` entries of `exclude` (taken from
    /// its end) make it into the instruction text.
    ///
    /// # Returns
    ///
    /// * `Err(ArcadeError::Internal)` - Alchemy was requested as a batch, or a
    ///   template failed to render
    pub fn build(
        &self,
        request: &PromptRequest,
        locale: Locale,
        exclude: &[String],
    ) -> Result<PromptSpec> {
        let language = locale.language_name();
        let exclude = &exclude[exclude.len().saturating_sub(self.exclusion_limit)..];

        let (instruction_text, response_shape) = match request {
            PromptRequest::Batch { mode, count } => {
                let (template, item_schema) = batch_parts(*mode)?;
                let text = self.render(
                    template,
                    context! { count => count, language => language, exclude => exclude },
                )?;
                (text, array_of(item_schema))
            }
            PromptRequest::AlchemyCombine { first, second } => (
                self.render(
                    "alchemy_combine",
                    context! { first => first, second => second, language => language },
                )?,
                alchemy_schema(),
            ),
            PromptRequest::WordLadderStep {
                current,
                candidate,
                target,
            } => (
                self.render(
                    "word_ladder_step",
                    context! {
                        current => current,
                        candidate => candidate,
                        target => target,
                        language => language,
                    },
                )?,
                step_verdict_schema(),
            ),
            PromptRequest::ArenaCombat {
                creature,
                description,
                difficulty_tier,
                action,
            } => (
                self.render(
                    "arena_combat",
                    context! {
                        creature => creature,
                        description => description,
                        tier => difficulty_tier,
                        action => action,
                        language => language,
                    },
                )?,
                combat_verdict_schema(),
            ),
        };

        tracing::trace!(mode = %request.mode(), chars = instruction_text.len(), "Built prompt");

        Ok(PromptSpec {
            instruction_text,
            response_shape,
            locale,
        })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map(|text| text.trim().to_string())
            .map_err(|e| ArcadeError::internal(format!("Failed to render prompt '{name}': {e}")))
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}

fn batch_parts(mode: GameMode) -> Result<(&'static str, Value)> {
    Ok(match mode {
        GameMode::EmojiRiddle => ("batch_emoji_riddle", emoji_puzzle_schema()),
        GameMode::Dilemma => ("batch_dilemma", dilemma_schema()),
        GameMode::WordLadder => ("batch_word_ladder", ladder_endpoints_schema()),
        GameMode::Cipher => ("batch_cipher", cipher_schema()),
        GameMode::Arena => ("batch_arena", creature_schema()),
        GameMode::Alchemy => {
            return Err(ArcadeError::internal("alchemy content is not generated in batches"));
        }
    })
}

fn object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    json!({ "type": "OBJECT", "properties": properties, "required": required })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn integer() -> Value {
    json!({ "type": "INTEGER" })
}

fn boolean() -> Value {
    json!({ "type": "BOOLEAN" })
}

fn alchemy_schema() -> Value {
    object(&[("name", string()), ("emoji", string())], &["name", "emoji"])
}

fn emoji_puzzle_schema() -> Value {
    let hints = json!({ "type": "ARRAY", "items": string(), "minItems": 5, "maxItems": 5 });
    object(
        &[("emojis", string()), ("answer", string()), ("hints", hints)],
        &["emojis", "answer", "hints"],
    )
}

fn dilemma_schema() -> Value {
    const FIELDS: [&str; 6] = [
        "title",
        "description",
        "optionA",
        "optionB",
        "consequenceA",
        "consequenceB",
    ];
    let properties: Vec<(&str, Value)> = FIELDS.iter().map(|f| (*f, string())).collect();
    object(&properties, &FIELDS)
}

fn ladder_endpoints_schema() -> Value {
    const FIELDS: [&str; 4] = ["startWord", "endWord", "startEmoji", "endEmoji"];
    let properties: Vec<(&str, Value)> = FIELDS.iter().map(|f| (*f, string())).collect();
    object(&properties, &FIELDS)
}

fn step_verdict_schema() -> Value {
    object(
        &[
            ("isValid", boolean()),
            ("message", string()),
            ("emoji", string()),
            ("proximity", integer()),
        ],
        &["isValid", "message"],
    )
}

fn cipher_schema() -> Value {
    const FIELDS: [&str; 4] = ["original", "encrypted", "rule", "category"];
    let properties: Vec<(&str, Value)> = FIELDS.iter().map(|f| (*f, string())).collect();
    object(&properties, &FIELDS)
}

fn creature_schema() -> Value {
    object(
        &[
            ("creature", string()),
            ("emoji", string()),
            ("description", string()),
            ("difficultyTier", integer()),
        ],
        &["creature", "emoji", "description", "difficultyTier"],
    )
}

fn combat_verdict_schema() -> Value {
    object(
        &[
            ("success", boolean()),
            ("commentary", string()),
            ("survivalChance", integer()),
            ("damageDealt", integer()),
        ],
        &["success", "commentary", "survivalChance", "damageDealt"],
    )
}
