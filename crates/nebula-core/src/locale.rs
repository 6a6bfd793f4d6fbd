//! Locale resolution for generated content.
//!
//! The locale chosen here decides the language the model writes puzzles in.
//! UI string localization is a separate concern and never feeds back into it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Environment variables consulted, in priority order, for the runtime's
/// language preference.
const LOCALE_ENV_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

/// The two content locales the arcade supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Locale {
    #[strum(serialize = "en")]
    #[serde(rename = "en")]
    English,
    #[strum(serialize = "es")]
    #[serde(rename = "es")]
    Spanish,
}

impl Locale {
    /// Locale used when the runtime gives no usable signal.
    pub const FALLBACK: Locale = Locale::Spanish;

    /// Collapses a language tag (`en-US`, `en_GB.UTF-8`, `es`, ...) into a
    /// supported locale.
    ///
    /// Tags starting with `en` resolve to English. Everything else, including
    /// an absent or empty tag, resolves to [`Locale::FALLBACK`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some(tag) if tag.to_ascii_lowercase().starts_with("en") => Locale::English,
            _ => Self::FALLBACK,
        }
    }

    /// Reads the runtime's language preference once and collapses it.
    pub fn detect() -> Self {
        let tag = LOCALE_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty() && value != "C" && value != "POSIX");
        Self::from_tag(tag.as_deref())
    }

    /// Human-readable language name used inside prompts.
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::Spanish => "Spanish",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_tags() {
        assert_eq!(Locale::from_tag(Some("en")), Locale::English);
        assert_eq!(Locale::from_tag(Some("en-US")), Locale::English);
        assert_eq!(Locale::from_tag(Some("en_GB.UTF-8")), Locale::English);
        assert_eq!(Locale::from_tag(Some("EN")), Locale::English);
    }

    #[test]
    fn test_fallback_is_deterministic() {
        assert_eq!(Locale::from_tag(None), Locale::Spanish);
        assert_eq!(Locale::from_tag(Some("")), Locale::Spanish);
        assert_eq!(Locale::from_tag(Some("fr-FR")), Locale::Spanish);
        assert_eq!(Locale::from_tag(Some("es_ES.UTF-8")), Locale::Spanish);
    }

    #[test]
    fn test_serialized_form() {
        assert_eq!(serde_json::to_string(&Locale::English).unwrap(), "\"en\"");
        assert_eq!(Locale::Spanish.to_string(), "es");
    }
}
