//! Credential resolution across the stored value, the environment and
//! `secret.json`.

use crate::storage::{SecretStorage, SecretStorageError};
use nebula_core::secret::{Credential, CredentialProvider, CredentialSource};
use nebula_core::storage::{CREDENTIAL_KEY, KeyValueStore};
use nebula_core::{ArcadeError, Result};
use std::sync::Arc;

/// Environment variables checked for an injected credential, in order.
pub const CREDENTIAL_ENV_VARS: &[&str] = &["NEBULA_API_KEY", "GEMINI_API_KEY", "API_KEY"];

/// The credential the user typed in, persisted in the key-value store.
pub struct StoredCredentialSource {
    store: Arc<dyn KeyValueStore>,
}

impl StoredCredentialSource {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl CredentialSource for StoredCredentialSource {
    fn name(&self) -> &'static str {
        "stored"
    }

    fn resolve(&self) -> Result<Option<Credential>> {
        Ok(self.store.get_item(CREDENTIAL_KEY).and_then(Credential::new))
    }
}

/// A credential injected by the host through environment variables.
pub struct EnvCredentialSource {
    variables: Vec<String>,
}

impl EnvCredentialSource {
    /// Checks [`CREDENTIAL_ENV_VARS`].
    pub fn new() -> Self {
        Self::with_variables(CREDENTIAL_ENV_VARS.iter().copied())
    }

    pub fn with_variables<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvCredentialSource {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn resolve(&self) -> Result<Option<Credential>> {
        Ok(self
            .variables
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find_map(Credential::new))
    }
}

/// The Gemini key from `secret.json`.
pub struct SecretFileCredentialSource {
    storage: SecretStorage,
}

impl SecretFileCredentialSource {
    pub fn new(storage: SecretStorage) -> Self {
        Self { storage }
    }
}

impl CredentialSource for SecretFileCredentialSource {
    fn name(&self) -> &'static str {
        "secret_file"
    }

    fn resolve(&self) -> Result<Option<Credential>> {
        match self.storage.load() {
            Ok(config) => Ok(config.gemini.and_then(|gemini| Credential::new(gemini.api_key))),
            Err(SecretStorageError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Resolves the active credential from an ordered list of sources.
///
/// Nothing is memoized: every [`CredentialResolver::get_credential`] call
/// re-reads the sources, so a credential swapped after a quota error is
/// picked up by the very next request.
pub struct CredentialResolver {
    store: Arc<dyn KeyValueStore>,
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialResolver {
    /// Creates a resolver with the standard priority: stored value, then
    /// environment.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let sources: Vec<Box<dyn CredentialSource>> = vec![
            Box::new(StoredCredentialSource::new(store.clone())),
            Box::new(EnvCredentialSource::new()),
        ];
        Self { store, sources }
    }

    /// Appends a lower-priority source.
    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Replaces every source. The store is still used by
    /// [`set_credential`](Self::set_credential) and
    /// [`clear_credential`](Self::clear_credential).
    pub fn with_sources(
        store: Arc<dyn KeyValueStore>,
        sources: Vec<Box<dyn CredentialSource>>,
    ) -> Self {
        Self { store, sources }
    }

    /// Returns the first non-empty credential.
    ///
    /// A source that fails to read is logged and skipped.
    ///
    /// # Returns
    ///
    /// - `Ok(Credential)`: a source yielded a non-blank value
    /// - `Err(ArcadeError::CredentialMissing)`: no source did
    pub fn get_credential(&self) -> Result<Credential> {
        for source in &self.sources {
            match source.resolve() {
                Ok(Some(credential)) => {
                    tracing::trace!(source = source.name(), "Resolved credential");
                    return Ok(credential);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(source = source.name(), error = %err, "Credential source unreadable");
                }
            }
        }
        Err(ArcadeError::CredentialMissing)
    }

    /// Returns true when some source currently yields a credential.
    pub fn has_credential(&self) -> bool {
        self.get_credential().is_ok()
    }

    /// Persists a user-supplied credential, which then takes priority.
    pub fn set_credential(&self, value: &str) -> Result<()> {
        let credential = Credential::new(value).ok_or(ArcadeError::CredentialMissing)?;
        self.store.set_item(CREDENTIAL_KEY, credential.expose())?;
        tracing::info!("Stored user-supplied credential");
        Ok(())
    }

    /// Logout: forgets the user-supplied credential.
    ///
    /// Histories, queues and caches are left alone.
    pub fn clear_credential(&self) -> Result<()> {
        self.store.remove_item(CREDENTIAL_KEY)?;
        tracing::info!("Cleared stored credential");
        Ok(())
    }
}

impl CredentialProvider for CredentialResolver {
    fn current_credential(&self) -> Result<Credential> {
        self.get_credential()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::fs;
    use tempfile::TempDir;

    struct FixedSource(Option<&'static str>);

    impl CredentialSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn resolve(&self) -> Result<Option<Credential>> {
            Ok(self.0.and_then(Credential::new))
        }
    }

    struct BrokenSource;

    impl CredentialSource for BrokenSource {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn resolve(&self) -> Result<Option<Credential>> {
            Err(ArcadeError::storage("disk on fire"))
        }
    }

    fn resolver_with(store: Arc<MemoryStore>, fallback: Option<&'static str>) -> CredentialResolver {
        CredentialResolver::with_sources(
            store.clone(),
            vec![
                Box::new(StoredCredentialSource::new(store)),
                Box::new(FixedSource(fallback)),
            ],
        )
    }

    #[test]
    fn test_missing_when_no_source_has_value() {
        let resolver = resolver_with(Arc::new(MemoryStore::new()), None);
        assert_eq!(resolver.get_credential(), Err(ArcadeError::CredentialMissing));
        assert!(!resolver.has_credential());
    }

    #[test]
    fn test_stored_value_takes_priority() {
        let store = Arc::new(MemoryStore::new());
        let resolver = resolver_with(store, Some("injected"));
        assert_eq!(resolver.get_credential().unwrap().expose(), "injected");

        resolver.set_credential("typed-by-user").unwrap();
        assert_eq!(resolver.get_credential().unwrap().expose(), "typed-by-user");
    }

    #[test]
    fn test_swap_is_seen_on_next_call() {
        let store = Arc::new(MemoryStore::new());
        let resolver = resolver_with(store.clone(), None);

        resolver.set_credential("first").unwrap();
        assert_eq!(resolver.get_credential().unwrap().expose(), "first");

        store.set_item(CREDENTIAL_KEY, "second").unwrap();
        assert_eq!(resolver.get_credential().unwrap().expose(), "second");
    }

    #[test]
    fn test_blank_stored_value_falls_through() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(CREDENTIAL_KEY, "   ").unwrap();
        let resolver = resolver_with(store, Some("injected"));
        assert_eq!(resolver.get_credential().unwrap().expose(), "injected");
    }

    #[test]
    fn test_logout_clears_only_credential() {
        let store = Arc::new(MemoryStore::new());
        store.set_item("nebula.history.cipher", r#"["APPLE"]"#).unwrap();
        let resolver = resolver_with(store.clone(), None);
        resolver.set_credential("key").unwrap();

        resolver.clear_credential().unwrap();
        assert_eq!(resolver.get_credential(), Err(ArcadeError::CredentialMissing));
        assert!(store.get_item("nebula.history.cipher").is_some());
    }

    #[test]
    fn test_set_blank_credential_rejected() {
        let resolver = resolver_with(Arc::new(MemoryStore::new()), None);
        assert_eq!(resolver.set_credential("  "), Err(ArcadeError::CredentialMissing));
    }

    #[test]
    fn test_broken_source_is_skipped() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let resolver = CredentialResolver::with_sources(
            store,
            vec![Box::new(BrokenSource), Box::new(FixedSource(Some("backup")))],
        );
        assert_eq!(resolver.get_credential().unwrap().expose(), "backup");
    }

    #[test]
    fn test_unset_env_source_is_empty() {
        let source = EnvCredentialSource::with_variables(["NEBULA_TEST_SURELY_UNSET_VARIABLE"]);
        assert_eq!(source.resolve().unwrap(), None);
    }

    #[test]
    fn test_secret_file_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");

        let source = SecretFileCredentialSource::new(SecretStorage::with_path(path.clone()));
        assert_eq!(source.resolve().unwrap(), None);

        fs::write(&path, r#"{"gemini": {"api_key": "from-file"}}"#).unwrap();
        assert_eq!(source.resolve().unwrap().unwrap().expose(), "from-file");
    }
}
