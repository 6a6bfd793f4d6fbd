//! Domain types and seams for the Nebula Arcade orchestration layer.
//!
//! Nothing here performs I/O. Storage, credentials and the model endpoint are
//! reached through the traits in [`storage`], [`secret`] and [`model`].

pub mod config;
pub mod content;
pub mod error;
pub mod history;
pub mod locale;
pub mod mode;
pub mod model;
pub mod prompt;
pub mod secret;
pub mod storage;

// Re-export common error type
pub use error::{ArcadeError, Result};
pub use history::History;
pub use locale::Locale;
pub use mode::GameMode;
