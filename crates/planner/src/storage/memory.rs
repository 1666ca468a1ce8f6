//! In-memory storage for tests and throwaway sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Storage;
use crate::error::StorageError;

/// In-memory [`Storage`]. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("tasks").unwrap(), None);

        storage.set_item("tasks", "[]").unwrap();
        assert_eq!(storage.get_item("tasks").unwrap().as_deref(), Some("[]"));

        storage.remove_item("tasks").unwrap();
        storage.remove_item("tasks").unwrap();
        assert_eq!(storage.get_item("tasks").unwrap(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set_item("k", "v").unwrap();
        assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v"));
    }
}
