//! Unified path management for arcade configuration and storage files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/nebula-arcade/        # Config directory
//! ├── config.toml                 # Arcade configuration
//! └── secret.json                 # API keys
//!
//! ~/.local/share/nebula-arcade/   # Data directory
//! └── storage.json                # Key-value store (credential, histories, caches)
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "nebula-arcade";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for nebula_core::ArcadeError {
    fn from(err: PathError) -> Self {
        nebula_core::ArcadeError::config(err.to_string())
    }
}

/// Resolves every file the arcade reads or writes.
///
/// A base directory override puts config and data side by side under it,
/// which is what tests use.
#[derive(Debug, Clone, Default)]
pub struct NebulaPaths {
    base: Option<PathBuf>,
}

impl NebulaPaths {
    /// Creates a resolver, optionally rooted at `base` instead of the
    /// platform directories.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the configuration directory (e.g., `~/.config/nebula-arcade/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the data directory (e.g., `~/.local/share/nebula-arcade/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Path to `secret.json`.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Path to the JSON key-value store.
    pub fn storage_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("storage.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override() {
        let paths = NebulaPaths::new(Some(PathBuf::from("/tmp/nebula-test")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/nebula-test/config.toml")
        );
        assert_eq!(
            paths.secret_file().unwrap(),
            PathBuf::from("/tmp/nebula-test/secret.json")
        );
        assert_eq!(
            paths.storage_file().unwrap(),
            PathBuf::from("/tmp/nebula-test/storage.json")
        );
    }

    #[test]
    fn test_default_paths_use_app_dir() {
        let paths = NebulaPaths::default();
        if let Ok(dir) = paths.config_dir() {
            assert!(dir.ends_with(APP_DIR));
        }
    }
}
