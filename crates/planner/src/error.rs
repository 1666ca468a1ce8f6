//! Planner error types.

use thiserror::Error;

/// Failures of a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Reading or writing the backing file failed.
    #[error("storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The browser store is missing or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failures of planner operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Collection could not be encoded for writing.
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A required text field was empty after trimming.
    #[error("{0} is required")]
    Required(&'static str),

    /// Amount must be greater than zero.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Rating outside 1..=5.
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// No record with this id.
    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },

    /// Set index out of range for an exercise.
    #[error("exercise {exercise_id} has no set {index}")]
    NoSuchSet { exercise_id: String, index: usize },
}

impl PlannerError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_owned(),
        }
    }
}
