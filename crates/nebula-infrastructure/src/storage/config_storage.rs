//! `config.toml` loading.

use nebula_core::config::ArcadeConfig;
use nebula_core::{ArcadeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only handle to the arcade's TOML configuration file.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a handle for the config file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// A missing or empty file yields [`ArcadeConfig::default`]; a file that
    /// does not parse is an error rather than a silent fallback.
    pub fn load(&self) -> Result<ArcadeConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(ArcadeConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ArcadeConfig::default());
        }

        let config: ArcadeConfig = toml::from_str(&content).map_err(|e| {
            ArcadeError::config(format!(
                "Failed to parse configuration file at {}: {}",
                self.path.display(),
                e
            ))
        })?;
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &ArcadeConfig) -> Result<()> {
    if config.retry.max_attempts == 0 {
        return Err(ArcadeError::config("retry.max_attempts must be at least 1"));
    }
    if config.queue.batch_size == 0 {
        return Err(ArcadeError::config("queue.batch_size must be at least 1"));
    }
    if config.cache.capacity == 0 {
        return Err(ArcadeError::config("cache.capacity must be at least 1"));
    }
    Ok(())
}
