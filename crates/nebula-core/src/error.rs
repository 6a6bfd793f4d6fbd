//! Error types for the Nebula Arcade orchestration layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed error taxonomy shared by every layer of the arcade.
///
/// Provider-specific error shapes are mapped into these variants at the
/// transport boundary; nothing downstream inspects raw status codes.
/// The type is `Clone` so that a single failure can be handed to every
/// caller waiting on the same batch fetch.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArcadeError {
    /// No credential source yielded a non-empty value.
    #[error("No API credential configured")]
    CredentialMissing,

    /// The provider rejected the credential.
    #[error("API credential rejected: {0}")]
    CredentialInvalid(String),

    /// The account's quota is spent; recovery needs out-of-band action.
    #[error("Model quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Transient failures persisted through every retry.
    #[error("max retries exceeded after {attempts} attempts: {last_message}")]
    RetriesExhausted { attempts: u32, last_message: String },

    /// Any other provider failure, surfaced as-is.
    #[error("Model provider error{}: {}", .status.map(|s| format!(" ({s})")).unwrap_or_default(), .message)]
    Provider {
        status: Option<u16>,
        message: String,
    },

    /// The model answered with something that is not the expected shape.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// A player action that the current game state does not allow.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Key-value persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArcadeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a MalformedResponse error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates an InvalidAction error
    pub fn invalid_action(message: impl Into<String>) -> Self {
        Self::InvalidAction(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a quota error
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }

    /// Check if this is a credential error (missing or rejected)
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::CredentialMissing | Self::CredentialInvalid(_))
    }

    /// Check if this is a decode-time failure
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    /// Returns true when the user has to act out-of-band before the model
    /// can be used again (new credential or new quota).
    pub fn is_fatal(&self) -> bool {
        self.is_credential() || self.is_quota_exceeded()
    }

    /// Returns true when triggering the same action again may succeed.
    pub fn is_retryable_by_user(&self) -> bool {
        matches!(
            self,
            Self::RetriesExhausted { .. } | Self::MalformedResponse(_) | Self::Provider { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ArcadeError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for ArcadeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ArcadeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ArcadeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ArcadeError>`.
pub type Result<T> = std::result::Result<T, ArcadeError>;
