//! Answer history used to steer generation away from repeats.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, de-duplicated list of answer identifiers already served for one
/// game mode.
///
/// Identifiers are compared after trimming and lowercasing, so "Steam" and
/// " steam " count as the same answer. The original spelling of the first
/// occurrence is kept for prompts. The list only grows; callers that need a
/// bounded view use [`History::recent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct History {
    entries: Vec<String>,
    index: HashSet<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized form used for comparisons.
    pub fn normalize(identifier: &str) -> String {
        identifier.trim().to_lowercase()
    }

    /// Returns true when `identifier` has already been recorded.
    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains(&Self::normalize(identifier))
    }

    /// Appends an identifier.
    ///
    /// Returns false (and leaves the history untouched) when the identifier
    /// is blank or already present.
    pub fn record(&mut self, identifier: &str) -> bool {
        let normalized = Self::normalize(identifier);
        if normalized.is_empty() || !self.index.insert(normalized) {
            return false;
        }
        self.entries.push(identifier.trim().to_string());
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<String>> for History {
    fn from(entries: Vec<String>) -> Self {
        let mut history = History::new();
        for entry in &entries {
            history.record(entry);
        }
        history
    }
}

impl From<History> for Vec<String> {
    fn from(history: History) -> Self {
        history.entries
    }
}

impl<S: AsRef<str>> FromIterator<S> for History {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut history = History::new();
        for entry in iter {
            history.record(entry.as_ref());
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_case_insensitive() {
        let mut history = History::new();
        assert!(history.record("Steam"));
        assert!(!history.record(" steam "));
        assert!(!history.record(""));
        assert_eq!(history.len(), 1);
        assert!(history.contains("STEAM"));
    }

    #[test]
    fn test_serializes_as_string_array() {
        let history: History = ["Fire", "Water"].into_iter().collect();
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"["Fire","Water"]"#);

        let restored: History = serde_json::from_str(r#"["Fire","fire","Water"]"#).unwrap();
        assert_eq!(restored.entries(), &["Fire".to_string(), "Water".to_string()]);
        assert!(restored.contains("water"));
    }
}
