//! Credential types and the source trait used by the credential resolver.

use crate::error::Result;

/// An opaque API secret.
///
/// `Debug` is redacted so credentials never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw value, returning `None` when it is blank.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Exposes the secret for the one place that must send it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// One place a credential may come from.
///
/// # Security Note
///
/// Implementations must never log the value they return, and error messages
/// must not contain it.
pub trait CredentialSource: Send + Sync {
    /// Short name for diagnostics ("stored", "environment", ...).
    fn name(&self) -> &'static str;

    /// Reads the current value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Credential))`: the source holds a non-blank value
    /// - `Ok(None)`: the source is empty
    /// - `Err`: the source exists but could not be read
    fn resolve(&self) -> Result<Option<Credential>>;
}

/// Something that can hand out the active credential.
///
/// The transport calls this on every attempt, so implementations must
/// re-read their sources instead of memoizing.
pub trait CredentialProvider: Send + Sync {
    fn current_credential(&self) -> Result<Credential>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_rejected() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        assert_eq!(Credential::new("  key-1 ").unwrap().expose(), "key-1");
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("super-secret").unwrap();
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }
}
