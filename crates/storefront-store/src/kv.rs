//! Key-value slots with automatic serialization.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;

use crate::{ChangeFeed, OriginId, StoreChange, StoreError};

/// Pending notifications kept per feed before the oldest are dropped.
const CHANGE_CAPACITY: usize = 64;

#[derive(Debug)]
struct Slots {
    values: RwLock<HashMap<String, Vec<u8>>>,
    changes: broadcast::Sender<StoreChange>,
}

/// Type-safe in-memory store shared by every handle created from it.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Nothing is written to disk; the slots
/// live as long as at least one handle does.
#[derive(Debug)]
pub struct MemoryStore {
    slots: Arc<Slots>,
    origin: OriginId,
}

impl MemoryStore {
    /// Create an empty store and its first handle.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            slots: Arc::new(Slots {
                values: RwLock::new(HashMap::new()),
                changes,
            }),
            origin: OriginId::generate(),
        }
    }

    /// Create another handle onto the same slots.
    ///
    /// The new handle has its own origin, so writes made through it show up
    /// on the feeds of every other handle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use storefront_store::MemoryStore;
    ///
    /// let page = MemoryStore::new();
    /// let other_tab = page.handle();
    /// assert_ne!(page.origin(), other_tab.origin());
    /// ```
    pub fn handle(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            origin: OriginId::generate(),
        }
    }

    /// The origin recorded on changes made through this handle.
    pub fn origin(&self) -> &OriginId {
        &self.origin
    }

    /// Get a value from the store.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let values = self
            .slots
            .values
            .read()
            .map_err(|_| StoreError::Poisoned(key.to_string()))?;

        match values.get(key) {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the store and notify the other handles.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        {
            let mut values = self
                .slots
                .values
                .write()
                .map_err(|_| StoreError::Poisoned(key.to_string()))?;
            values.insert(key.to_string(), bytes);
        }
        self.notify(key);
        Ok(())
    }

    /// Delete a value from the store.
    ///
    /// Returns whether the key existed. Other handles are only notified when
    /// something was actually removed.
    pub fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed = self
            .slots
            .values
            .write()
            .map_err(|_| StoreError::Poisoned(key.to_string()))?
            .remove(key)
            .is_some();

        if removed {
            self.notify(key);
        }
        Ok(removed)
    }

    /// Check if a key exists in the store.
    pub fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let values = self
            .slots
            .values
            .read()
            .map_err(|_| StoreError::Poisoned(key.to_string()))?;
        Ok(values.contains_key(key))
    }

    /// Get all keys in the store, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let values = self
            .slots
            .values
            .read()
            .map_err(|_| StoreError::Poisoned("*".to_string()))?;
        let mut keys: Vec<String> = values.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Subscribe to changes made through other handles.
    ///
    /// Only changes made after this call are delivered.
    pub fn watch(&self) -> ChangeFeed {
        ChangeFeed::new(self.slots.changes.subscribe(), self.origin.clone())
    }

    fn notify(&self, key: &str) {
        let change = StoreChange {
            key: key.to_string(),
            origin: self.origin.clone(),
        };
        // No receivers just means nobody is watching yet.
        if self.slots.changes.send(change).is_err() {
            tracing::trace!(key, "store change with no watchers");
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to build store keys with namespacing.
///
/// # Example
///
/// ```rust
/// use storefront_store::store_key;
///
/// let key = store_key!("cart", "state");
/// assert_eq!(key, "cart:state");
/// ```
#[macro_export]
macro_rules! store_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        items: Vec<String>,
        coupon: Option<String>,
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            items: vec!["1".to_string(), "2".to_string()],
            coupon: Some("SAVE10".to_string()),
        }
    }

    #[test]
    fn test_get_missing_key() {
        let store = MemoryStore::new();
        let value: Option<Snapshot> = store.get("cart:state").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_handles_share_slots() {
        let page = MemoryStore::new();
        let other = page.handle();

        page.set("cart:state", &snapshot()).unwrap();

        let seen: Option<Snapshot> = other.get("cart:state").unwrap();
        assert_eq!(seen, Some(snapshot()));
        assert!(other.exists("cart:state").unwrap());
    }

    #[test]
    fn test_type_mismatch_is_serialization_error() {
        let store = MemoryStore::new();
        store.set("cart:state", &"not a snapshot").unwrap();

        let result: Result<Option<Snapshot>, _> = store.get("cart:state");
        assert!(matches!(result, Err(StoreError::SerializeError(_))));
    }

    #[test]
    fn test_own_writes_are_not_on_own_feed() {
        let page = MemoryStore::new();
        let mut feed = page.watch();

        page.set("cart:state", &snapshot()).unwrap();

        assert!(feed.try_next().is_none());
    }

    #[test]
    fn test_other_handle_sees_changes() {
        let page = MemoryStore::new();
        let other = page.handle();
        let mut feed = other.watch();

        page.set("cart:state", &snapshot()).unwrap();
        page.set("cart:state", &snapshot()).unwrap();

        let changes = feed.drain();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.key == "cart:state"));
        assert!(changes.iter().all(|c| &c.origin == page.origin()));
        assert!(feed.try_next().is_none());
    }

    #[test]
    fn test_delete_notifies_only_when_present() {
        let page = MemoryStore::new();
        let other = page.handle();
        let mut feed = other.watch();

        assert!(!page.delete("cart:state").unwrap());
        assert!(feed.try_next().is_none());

        page.set("cart:state", &snapshot()).unwrap();
        assert!(page.delete("cart:state").unwrap());

        assert_eq!(feed.drain().len(), 2);
        assert!(!other.exists("cart:state").unwrap());
    }

    #[test]
    fn test_keys_sorted() {
        let store = MemoryStore::new();
        store.set("wishlist:state", &1).unwrap();
        store.set("cart:state", &2).unwrap();

        assert_eq!(store.keys().unwrap(), vec!["cart:state", "wishlist:state"]);
    }

    #[test]
    fn test_lagged_feed_still_reports_latest() {
        let page = MemoryStore::new();
        let other = page.handle();
        let mut feed = other.watch();

        for i in 0..(CHANGE_CAPACITY + 10) {
            page.set(&store_key!("slot", i), &i).unwrap();
        }

        let changes = feed.drain();
        assert!(!changes.is_empty());
        assert!(changes.len() <= CHANGE_CAPACITY);
        let last = changes.last().map(|c| c.key.clone());
        assert_eq!(last, Some(store_key!("slot", CHANGE_CAPACITY + 9)));
    }

    #[tokio::test]
    async fn test_async_next_waits_for_other_handle() {
        let page = MemoryStore::new();
        let other = page.handle();
        let mut feed = other.watch();

        other.set("cart:state", &snapshot()).unwrap();
        page.set("cart:state", &snapshot()).unwrap();

        let change = feed.next().await.unwrap();
        assert_eq!(&change.origin, page.origin());
    }

    #[test]
    fn test_store_key_macro() {
        assert_eq!(store_key!("cart", "state"), "cart:state");
        assert_eq!(store_key!("cart", "user", 42), "cart:user:42");
    }
}
