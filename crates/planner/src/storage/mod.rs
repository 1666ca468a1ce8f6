//! Key-value storage backends and typed collections on top of them.
//!
//! [`Storage`] mirrors the browser `localStorage` contract: string keys,
//! string values, synchronous access. [`Collection`] layers a JSON array of
//! one record type over a single key.

mod file;
mod memory;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod web;

use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};

pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use web::WebStorage;

use crate::error::{PlannerError, StorageError};

/// A string key-value store.
pub trait Storage {
    /// Value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// A JSON array of `T` stored under one key.
pub struct Collection<'a, T> {
    storage: &'a dyn Storage,
    key: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T> Collection<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(storage: &'a dyn Storage, key: &'static str) -> Self {
        Self {
            storage,
            key,
            _item: PhantomData,
        }
    }

    /// The storage key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Read every item.
    ///
    /// A missing key yields an empty list. So does unreadable JSON, which is
    /// logged and left in place until the next write replaces it.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Storage` if the backend read fails.
    pub fn load(&self) -> Result<Vec<T>, PlannerError> {
        let Some(raw) = self.storage.get_item(self.key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(key = self.key, "Ignoring unreadable stored collection: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Replace the stored array with `items`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if encoding or the backend write fails.
    pub fn save(&self, items: &[T]) -> Result<(), PlannerError> {
        let raw = serde_json::to_string(items).map_err(|source| PlannerError::Encode {
            key: self.key,
            source,
        })?;
        self.storage.set_item(self.key, &raw)?;
        Ok(())
    }

    /// Load, apply `change`, and write the result back.
    ///
    /// Nothing is written if `change` fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `change`, or a load/save failure.
    pub fn update<R>(
        &self,
        change: impl FnOnce(&mut Vec<T>) -> Result<R, PlannerError>,
    ) -> Result<R, PlannerError> {
        let mut items = self.load()?;
        let result = change(&mut items)?;
        self.save(&items)?;
        Ok(result)
    }
}
