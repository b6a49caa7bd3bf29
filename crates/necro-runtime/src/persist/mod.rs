#![forbid(unsafe_code)]

//! Durable typed key/value state.
//!
//! A [`PersistentStore`] keeps one JSON object under a single storage key.
//! Reads substitute defaults lazily (the first read of an unset key yields
//! its default, later reads do not); every write persists the whole object
//! immediately through a [`StorageBackend`].

pub mod storage;
pub mod store;

use thiserror::Error;

pub use storage::{FileStorage, MemoryStorage, StorageBackend};
pub use store::PersistentStore;

/// Failures of a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for record `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{0}` is not a valid record key")]
    InvalidKey(String),
}

/// Failures of a [`PersistentStore`].
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("store defaults must serialize to a JSON object, got {0}")]
    DefaultsNotObject(&'static str),

    #[error("snapshot must serialize to a JSON object, got {0}")]
    SnapshotNotObject(&'static str),

    #[error("value could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
