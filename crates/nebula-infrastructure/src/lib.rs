//! Filesystem-, environment- and process-facing pieces of the arcade.

pub mod credential_resolver;
pub mod paths;
pub mod storage;
pub mod telemetry;

pub use crate::credential_resolver::{
    CredentialResolver, EnvCredentialSource, SecretFileCredentialSource, StoredCredentialSource,
};
pub use crate::paths::NebulaPaths;
pub use crate::storage::{ConfigStorage, JsonFileStore, MemoryStore, SecretStorage};

use anyhow::Context;
use nebula_core::config::ArcadeConfig;
use nebula_core::storage::KeyValueStore;
use std::sync::Arc;

/// Everything loaded from disk at startup.
pub struct LocalEnvironment {
    pub config: ArcadeConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub credentials: Arc<CredentialResolver>,
}

impl LocalEnvironment {
    /// Loads config, opens the key-value store and wires the credential
    /// resolver (stored value, environment, then `secret.json`).
    pub fn load(paths: &NebulaPaths) -> anyhow::Result<Self> {
        let config_path = paths
            .config_file()
            .context("Failed to resolve config file path")?;
        let config = ConfigStorage::new(config_path)
            .load()
            .context("Failed to load arcade configuration")?;

        let storage_path = paths
            .storage_file()
            .context("Failed to resolve storage file path")?;
        let store: Arc<dyn KeyValueStore> = Arc::new(
            JsonFileStore::open(storage_path).context("Failed to open key-value store")?,
        );

        let secret_storage =
            SecretStorage::new(paths).map_err(|e| anyhow::anyhow!("Failed to locate secret.json: {}", e))?;
        let credentials = CredentialResolver::new(store.clone())
            .with_source(SecretFileCredentialSource::new(secret_storage));

        Ok(Self {
            config,
            store,
            credentials: Arc::new(credentials),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.toml"), "[queue]\nbatch_size = 4\n").unwrap();
        fs::write(
            temp_dir.path().join("secret.json"),
            r#"{"gemini": {"api_key": "file-key"}}"#,
        )
        .unwrap();

        let paths = NebulaPaths::new(Some(temp_dir.path().to_path_buf()));
        let env = LocalEnvironment::load(&paths).unwrap();

        assert_eq!(env.config.queue.batch_size, 4);
        assert!(env.credentials.has_credential());

        env.credentials.set_credential("typed").unwrap();
        assert_eq!(env.credentials.get_credential().unwrap().expose(), "typed");
        assert!(temp_dir.path().join("storage.json").exists());
    }
}
