//! Recent searches and favorites.
//!
//! [`CityListManager`] is the single owner of both lists. Every mutation is
//! written to the store first and only then published to subscribers, so the
//! in-memory copy never runs ahead of what was persisted.

use std::{collections::BTreeSet, sync::Arc};

use tokio::sync::{Mutex, watch};

use crate::{
    error::Result,
    model::normalize_city,
    store::{self, FAVORITES_KEY, KeyValueStore, Loaded, RECENT_SEARCHES_KEY},
};

/// Upper bound on the recent searches list.
pub const MAX_RECENTS: usize = 5;

/// Move `city` to the front of `list`, dropping any older occurrence and
/// anything beyond [`MAX_RECENTS`].
pub fn push_recent(list: &[String], city: &str) -> Vec<String> {
    std::iter::once(city.to_string())
        .chain(list.iter().filter(|c| c.as_str() != city).cloned())
        .take(MAX_RECENTS)
        .collect()
}

/// Bring a stored list back within the invariants: no blanks, no repeats
/// (first occurrence wins), at most [`MAX_RECENTS`] entries.
fn sanitize_recents(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(MAX_RECENTS);
    for city in raw {
        let city = city.trim();
        if city.is_empty() || out.iter().any(|c| c == city) {
            continue;
        }
        out.push(city.to_string());
        if out.len() == MAX_RECENTS {
            break;
        }
    }
    out
}

fn sanitize_favorites(raw: Vec<String>) -> BTreeSet<String> {
    raw.into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

#[derive(Debug)]
pub struct CityListManager {
    store: Arc<dyn KeyValueStore>,
    recents: watch::Sender<Vec<String>>,
    favorites: watch::Sender<BTreeSet<String>>,
    // One writer per key: read-modify-write cycles on a list never interleave.
    recents_writer: Mutex<()>,
    favorites_writer: Mutex<()>,
}

impl CityListManager {
    /// Create a manager with both lists empty. Call [`Self::load_recents`] and
    /// [`Self::load_favorites`] (or use [`Self::load`]) to populate them.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (recents, _) = watch::channel(Vec::new());
        let (favorites, _) = watch::channel(BTreeSet::new());

        Self {
            store,
            recents,
            favorites,
            recents_writer: Mutex::new(()),
            favorites_writer: Mutex::new(()),
        }
    }

    /// Create a manager and load both lists from `store`.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let manager = Self::new(store);
        manager.load_recents().await?;
        manager.load_favorites().await?;
        Ok(manager)
    }

    /// Read recent searches from the store. Missing or malformed data yields
    /// an empty list; only storage failures are errors.
    pub async fn load_recents(&self) -> Result<Vec<String>> {
        let _writer = self.recents_writer.lock().await;

        let list = match store::load_json::<Vec<String>>(&*self.store, RECENT_SEARCHES_KEY).await? {
            Loaded::Value(raw) => sanitize_recents(raw),
            Loaded::Missing => Vec::new(),
            Loaded::Malformed(reason) => {
                tracing::warn!(key = RECENT_SEARCHES_KEY, %reason, "ignoring malformed recent searches");
                Vec::new()
            }
        };

        self.recents.send_replace(list.clone());
        Ok(list)
    }

    pub async fn load_favorites(&self) -> Result<BTreeSet<String>> {
        let _writer = self.favorites_writer.lock().await;

        let set = match store::load_json::<Vec<String>>(&*self.store, FAVORITES_KEY).await? {
            Loaded::Value(raw) => sanitize_favorites(raw),
            Loaded::Missing => BTreeSet::new(),
            Loaded::Malformed(reason) => {
                tracing::warn!(key = FAVORITES_KEY, %reason, "ignoring malformed favorites");
                BTreeSet::new()
            }
        };

        self.favorites.send_replace(set.clone());
        Ok(set)
    }

    /// Put `city` at the head of the recent searches and persist the list.
    ///
    /// Returns the list as committed.
    pub async fn record_search(&self, city: &str) -> Result<Vec<String>> {
        let city = normalize_city(city)?;
        let _writer = self.recents_writer.lock().await;

        let updated = push_recent(&self.recents.borrow(), &city);
        store::save_json(&*self.store, RECENT_SEARCHES_KEY, &updated).await?;

        tracing::debug!(%city, len = updated.len(), "recorded search");
        self.recents.send_replace(updated.clone());
        Ok(updated)
    }

    pub async fn clear_recents(&self) -> Result<()> {
        let _writer = self.recents_writer.lock().await;

        store::save_json::<[String]>(&*self.store, RECENT_SEARCHES_KEY, &[]).await?;
        self.recents.send_replace(Vec::new());
        Ok(())
    }

    /// Add `city` to favorites if absent, remove it otherwise.
    ///
    /// Returns `true` if the city is a favorite after the call.
    pub async fn toggle_favorite(&self, city: &str) -> Result<bool> {
        let city = normalize_city(city)?;
        let _writer = self.favorites_writer.lock().await;

        let mut updated = self.favorites.borrow().clone();
        let now_favorite = if updated.remove(&city) {
            false
        } else {
            updated.insert(city.clone());
            true
        };

        store::save_json(&*self.store, FAVORITES_KEY, &updated).await?;

        tracing::debug!(%city, now_favorite, "toggled favorite");
        self.favorites.send_replace(updated);
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.favorites.borrow().contains(city.trim())
    }

    pub fn recents(&self) -> Vec<String> {
        self.recents.borrow().clone()
    }

    pub fn favorites(&self) -> BTreeSet<String> {
        self.favorites.borrow().clone()
    }

    /// Receiver that observes every committed change to the recent searches.
    pub fn subscribe_recents(&self) -> watch::Receiver<Vec<String>> {
        self.recents.subscribe()
    }

    pub fn subscribe_favorites(&self) -> watch::Receiver<BTreeSet<String>> {
        self.favorites.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Error, StoreError},
        store::MemoryStore,
    };
    use async_trait::async_trait;

    /// Store whose writes always fail.
    #[derive(Debug, Default)]
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            self.0.get(key).await
        }

        async fn set(&self, key: &str, _value: String) -> std::result::Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        async fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
            self.0.remove(key).await
        }
    }

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn push_recent_moves_existing_to_front() {
        let list: Vec<String> = ["Oslo", "Paris", "Rome"].map(String::from).to_vec();
        assert_eq!(push_recent(&list, "Paris"), ["Paris", "Oslo", "Rome"]);
    }

    #[test]
    fn push_recent_caps_length() {
        let mut list = Vec::new();
        for city in ["A", "B", "C", "D", "E", "F", "G"] {
            list = push_recent(&list, city);
        }
        assert_eq!(list, ["G", "F", "E", "D", "C"]);
    }

    #[test]
    fn any_sequence_stays_bounded_and_unique() {
        let cities = ["Paris", "Rome", "Oslo", "Paris", "Lima", "Kyiv", "Rome", "Cairo", "Oslo"];
        let mut list = Vec::new();

        for (i, city) in cities.iter().enumerate() {
            list = push_recent(&list, city);

            assert!(list.len() <= MAX_RECENTS, "too long after step {i}");
            let unique: BTreeSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len(), "duplicate after step {i}");
            assert_eq!(list[0], *city);
        }
    }

    #[tokio::test]
    async fn record_search_is_idempotent_in_effect() {
        let lists = CityListManager::new(memory());

        let first = lists.record_search("Paris").await.unwrap();
        let second = lists.record_search("Paris").await.unwrap();

        assert_eq!(second[0], "Paris");
        assert_eq!(first.len(), second.len());
        assert_eq!(second, ["Paris"]);
    }

    #[tokio::test]
    async fn record_search_persists_and_reloads() {
        let store = memory();
        let lists = CityListManager::new(store.clone());

        for city in ["Rome", "Oslo", " Lima "] {
            lists.record_search(city).await.unwrap();
        }

        let raw = store.get(RECENT_SEARCHES_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"["Lima","Oslo","Rome"]"#);

        let reloaded = CityListManager::load(store).await.unwrap();
        assert_eq!(reloaded.recents(), ["Lima", "Oslo", "Rome"]);
    }

    #[tokio::test]
    async fn blank_city_is_rejected_before_touching_store() {
        let store = Arc::new(ReadOnlyStore::default());
        let lists = CityListManager::new(store);

        // A write attempt would fail with Storage; Validation proves none happened.
        assert!(matches!(lists.record_search("   ").await, Err(Error::Validation)));
        assert!(matches!(lists.toggle_favorite("").await, Err(Error::Validation)));
    }

    #[tokio::test]
    async fn malformed_recents_load_as_empty() {
        let store = memory();
        store.set(RECENT_SEARCHES_KEY, "[\"Paris\",".into()).await.unwrap();

        let lists = CityListManager::new(store.clone());
        assert!(lists.load_recents().await.unwrap().is_empty());

        store.set(RECENT_SEARCHES_KEY, r#"{"city":"Paris"}"#.into()).await.unwrap();
        assert!(lists.load_recents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_favorites_load_as_empty() {
        let store = memory();
        store.set(FAVORITES_KEY, "not json".into()).await.unwrap();

        let lists = CityListManager::new(store.clone());
        assert!(lists.load_favorites().await.unwrap().is_empty());

        assert!(lists.toggle_favorite("Rome").await.unwrap());
        assert_eq!(
            store.get(FAVORITES_KEY).await.unwrap().as_deref(),
            Some(r#"["Rome"]"#)
        );
    }

    #[tokio::test]
    async fn legacy_recents_are_sanitized_on_load() {
        let store = memory();
        store
            .set(
                RECENT_SEARCHES_KEY,
                r#"["Paris","","Paris","Rome","Oslo","Lima","Kyiv","Cairo"]"#.into(),
            )
            .await
            .unwrap();

        let lists = CityListManager::new(store);
        let loaded = lists.load_recents().await.unwrap();

        assert_eq!(loaded, ["Paris", "Rome", "Oslo", "Lima", "Kyiv"]);
    }

    #[tokio::test]
    async fn toggle_favorite_twice_returns_to_empty() {
        let store = memory();
        let lists = CityListManager::new(store.clone());

        assert!(lists.toggle_favorite("Rome").await.unwrap());
        assert!(lists.is_favorite("Rome"));
        assert!(!lists.toggle_favorite("Rome").await.unwrap());

        assert!(lists.favorites().is_empty());
        assert_eq!(store.get(FAVORITES_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn favorites_collapse_duplicates_on_read() {
        let store = memory();
        store
            .set(FAVORITES_KEY, r#"["Rome","Oslo","Rome","Rome"]"#.into())
            .await
            .unwrap();

        let lists = CityListManager::new(store);
        let favorites = lists.load_favorites().await.unwrap();
        assert_eq!(favorites.len(), 2);

        // One toggle removes the city entirely, not just one copy.
        assert!(!lists.toggle_favorite("Rome").await.unwrap());
        assert!(!lists.is_favorite("Rome"));
    }

    #[tokio::test]
    async fn favorites_are_case_sensitive() {
        let lists = CityListManager::new(memory());

        lists.toggle_favorite("rome").await.unwrap();
        lists.toggle_favorite("Rome").await.unwrap();

        assert_eq!(lists.favorites().len(), 2);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let store = Arc::new(ReadOnlyStore::default());
        let lists = CityListManager::new(store);

        let err = lists.toggle_favorite("Rome").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!lists.is_favorite("Rome"));

        assert!(lists.record_search("Rome").await.is_err());
        assert!(lists.recents().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_committed_changes() {
        let lists = CityListManager::new(memory());
        let mut recents = lists.subscribe_recents();
        let mut favorites = lists.subscribe_favorites();

        lists.record_search("Oslo").await.unwrap();
        assert!(recents.has_changed().unwrap());
        assert_eq!(*recents.borrow_and_update(), ["Oslo"]);

        lists.toggle_favorite("Oslo").await.unwrap();
        assert!(favorites.has_changed().unwrap());
        assert!(favorites.borrow_and_update().contains("Oslo"));

        lists.clear_recents().await.unwrap();
        assert!(recents.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn concurrent_mutations_keep_invariants() {
        let lists = Arc::new(CityListManager::new(memory()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let lists = lists.clone();
            handles.push(tokio::spawn(async move {
                let city = format!("City{}", i % 7);
                lists.record_search(&city).await.unwrap();
                lists.toggle_favorite(&city).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let recents = lists.recents();
        assert!(recents.len() <= MAX_RECENTS);
        let unique: BTreeSet<_> = recents.iter().collect();
        assert_eq!(unique.len(), recents.len());

        // Memory and store agree once all writers are done.
        let reloaded = lists.load_recents().await.unwrap();
        assert_eq!(reloaded, recents);
    }
}
