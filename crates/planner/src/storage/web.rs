//! Browser `localStorage` backend (wasm32 with the `web` feature).

use wasm_bindgen::JsValue;

use super::Storage;
use crate::error::StorageError;

/// [`Storage`] over `window.localStorage`.
///
/// The handle is looked up on every call; browsers may disable storage at
/// any time (private mode, quota settings).
#[derive(Clone, Copy, Debug, Default)]
pub struct WebStorage;

impl WebStorage {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn local_storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(describe)?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))
    }
}

fn describe(value: JsValue) -> StorageError {
    StorageError::Unavailable(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

impl Storage for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::local_storage()?.get_item(key).map_err(describe)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::local_storage()?.set_item(key, value).map_err(describe)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::local_storage()?.remove_item(key).map_err(describe)
    }
}
