//! Persistent, bounded cache of model results keyed by canonical request
//! signatures.

use nebula_core::Result;
use nebula_core::storage::KeyValueStore;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Canonical key for a commutative relation: both sides trimmed and
/// lowercased, sorted, then joined with `+`.
///
/// `symmetric_key("Water", "fire") == symmetric_key(" FIRE ", "water")`.
pub fn symmetric_key(a: &str, b: &str) -> String {
    let mut parts = [canonical(a), canonical(b)];
    parts.sort();
    parts.join("+")
}

/// Canonical key for an ordered relation: parts trimmed and lowercased,
/// joined with `->` in the given order.
pub fn ordered_key(parts: &[&str]) -> String {
    parts.iter().map(|part| canonical(part)).collect::<Vec<_>>().join("->")
}

fn canonical(part: &str) -> String {
    part.trim().to_lowercase()
}

/// A key → result map with oldest-inserted eviction.
///
/// The whole map is stored as one JSON object under `storage_key` and
/// rewritten after every insert. Entries keep their insertion order across
/// reloads, so eviction stays oldest-first after a restart.
pub struct ContentCache<V> {
    store: Arc<dyn KeyValueStore>,
    storage_key: &'static str,
    capacity: usize,
    entries: Mutex<CacheEntries<V>>,
}

impl<V> ContentCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send,
{
    /// Loads the cache persisted under `storage_key`.
    ///
    /// A missing or unreadable blob starts an empty cache; the cache is an
    /// optimization and never blocks play.
    pub fn load(store: Arc<dyn KeyValueStore>, storage_key: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = match store.get_item(storage_key) {
            Some(raw) => serde_json::from_str::<CacheEntries<V>>(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = storage_key, error = %e, "Discarding unreadable cache");
                CacheEntries::new()
            }),
            None => CacheEntries::new(),
        };
        while entries.len() > capacity {
            entries.pop_oldest();
        }

        tracing::debug!(key = storage_key, entries = entries.len(), "Loaded content cache");

        Self {
            store,
            storage_key,
            capacity,
            entries: Mutex::new(entries),
        }
    }

    /// Gets a cached result by canonical key.
    ///
    /// # Returns
    ///
    /// `Some(value)` on a hit, `None` otherwise.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().await;
        let hit = entries.values.get(key).cloned();
        tracing::trace!(cache = self.storage_key, key, hit = hit.is_some(), "Cache lookup");
        hit
    }

    /// Inserts a result and persists the cache.
    ///
    /// When the cache is full and `key` is new, the oldest entry is evicted
    /// first. Re-inserting an existing key replaces its value in place.
    ///
    /// # Arguments
    ///
    /// * `key` - Canonical key, see [`symmetric_key`] and [`ordered_key`]
    /// * `value` - The decoded result to cache
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be serialized or written.
    pub async fn put(&self, key: String, value: V) -> Result<()> {
        let mut entries = self.entries.lock().await;

        if !entries.values.contains_key(&key) {
            while entries.len() >= self.capacity {
                if let Some(evicted) = entries.pop_oldest() {
                    tracing::debug!(cache = self.storage_key, key = %evicted, "Evicted cache entry");
                }
            }
        }
        entries.insert(key, value);

        let raw = serde_json::to_string(&*entries)?;
        self.store.set_item(self.storage_key, &raw)
    }

    /// Returns true when `key` is cached.
    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.values.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every entry and removes the persisted blob.
    pub async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        *entries = CacheEntries::new();
        self.store.remove_item(self.storage_key)
    }
}

/// Map plus insertion order, serialized as a plain JSON object.
struct CacheEntries<V> {
    values: HashMap<String, V>,
    order: VecDeque<String>,
}

impl<V> CacheEntries<V> {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn insert(&mut self, key: String, value: V) {
        if self.values.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
    }

    fn pop_oldest(&mut self) -> Option<String> {
        let key = self.order.pop_front()?;
        self.values.remove(&key);
        Some(key)
    }
}

impl<V: Serialize> Serialize for CacheEntries<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.order
                .iter()
                .filter_map(|key| self.values.get(key).map(|value| (key, value))),
        )
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for CacheEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = CacheEntries<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of cached results")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = CacheEntries::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.insert(key, value);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::content::AlchemyCombination;
    use nebula_infrastructure::MemoryStore;

    const KEY: &str = "nebula.cache.test";

    fn steam() -> AlchemyCombination {
        AlchemyCombination {
            name: "Steam".into(),
            emoji: "💨".into(),
        }
    }

    #[test]
    fn test_symmetric_key_is_commutative() {
        assert_eq!(symmetric_key("Water", "Fire"), symmetric_key("fire", " WATER "));
        assert_eq!(symmetric_key("Water", "Fire"), "fire+water");
        assert_eq!(symmetric_key("Mud", "Mud"), "mud+mud");
    }

    #[test]
    fn test_ordered_key_keeps_order() {
        assert_eq!(ordered_key(&["Seed", "Tree", "Forest"]), "seed->tree->forest");
        assert_ne!(ordered_key(&["a", "b"]), ordered_key(&["b", "a"]));
    }

    #[tokio::test]
    async fn test_commutative_lookup_hits_same_entry() {
        let cache = ContentCache::load(Arc::new(MemoryStore::new()), KEY, 10);
        cache.put(symmetric_key("Fire", "Water"), steam()).await.unwrap();

        assert_eq!(cache.get(&symmetric_key("Water", "Fire")).await, Some(steam()));
        assert_eq!(cache.get(&symmetric_key("Water", "Earth")).await, None);
    }

    #[tokio::test]
    async fn test_bounded_by_capacity() {
        let cache = ContentCache::load(Arc::new(MemoryStore::new()), KEY, 500);
        for i in 0..501 {
            cache.put(format!("key-{i}"), i).await.unwrap();
        }

        assert!(cache.len().await <= 500);
        assert!(!cache.contains("key-0").await);
        assert!(cache.contains("key-1").await);
        assert!(cache.contains("key-500").await);
    }

    #[tokio::test]
    async fn test_replacing_existing_key_does_not_evict() {
        let cache = ContentCache::load(Arc::new(MemoryStore::new()), KEY, 2);
        cache.put("a".into(), 1).await.unwrap();
        cache.put("b".into(), 2).await.unwrap();
        cache.put("a".into(), 3).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, Some(3));
        assert_eq!(cache.get("b").await, Some(2));
    }

    #[tokio::test]
    async fn test_persisted_as_object_and_reloaded_in_order() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cache = ContentCache::load(store.clone(), KEY, 3);
        cache.put("z".into(), 1).await.unwrap();
        cache.put("a".into(), 2).await.unwrap();
        cache.put("m".into(), 3).await.unwrap();

        let raw = store.get_item(KEY).unwrap();
        let object: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(object["z"], 1);

        // Oldest ("z") goes first even though it sorts last
        let reloaded = ContentCache::<i32>::load(store.clone(), KEY, 3);
        reloaded.put("n".into(), 4).await.unwrap();
        assert!(!reloaded.contains("z").await);
        assert!(reloaded.contains("a").await);
    }

    #[tokio::test]
    async fn test_unreadable_blob_starts_empty() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set_item(KEY, "not json").unwrap();

        let cache = ContentCache::<AlchemyCombination>::load(store, KEY, 10);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_removes_persisted_blob() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cache = ContentCache::load(store.clone(), KEY, 10);
        cache.put("k".into(), steam()).await.unwrap();

        cache.clear().await.unwrap();
        assert!(cache.is_empty().await);
        assert_eq!(store.get_item(KEY), None);
    }
}
