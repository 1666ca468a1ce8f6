//! Homebase personal planner.
//!
//! Tasks, workouts, a watchlist and expenses kept entirely in a local
//! key-value store. Each collection is a JSON array under one key and every
//! change rewrites the whole array, the way browser `localStorage` is used.
//!
//! The same state can live in memory (tests), in a directory of JSON files
//! (the CLI) or in the browser (`web` feature on wasm32).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod expenses;
pub mod storage;
pub mod tasks;
pub mod watchlist;
pub mod workouts;

pub use error::{PlannerError, StorageError};
pub use storage::{Collection, FileStorage, MemoryStorage, Storage};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use storage::WebStorage;

/// Generate an id for a new record.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Case-insensitive substring match; an empty needle matches everything.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Keep items whose `id` differs from `id`; true if something was removed.
pub(crate) fn remove_by_id<T>(items: &mut Vec<T>, id: &str, item_id: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| item_id(item) != id);
    items.len() != before
}
