//! Store error types.

use thiserror::Error;

/// Errors that can occur when using the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// A writer panicked while holding the slot lock.
    #[error("Store lock poisoned while accessing {0}")]
    Poisoned(String),
}
