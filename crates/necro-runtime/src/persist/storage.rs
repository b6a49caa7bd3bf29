#![forbid(unsafe_code)]

//! Where persisted records live.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::trace;

use super::StorageError;

/// A string-keyed blob store, the shape of browser local storage.
pub trait StorageBackend {
    /// The record under `key`, or `None` if there is none.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the record under `key`.
    fn store(&self, key: &str, blob: &str) -> Result<(), StorageError>;

    /// Delete the record under `key`. Deleting a missing record succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    records: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw record under `key`.
    #[must_use]
    pub fn record(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.record(key))
    }

    fn store(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.records.borrow_mut().remove(key);
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("records", &self.len())
            .finish()
    }
}

/// One `<dir>/<key>.json` file per record.
///
/// Writes go to a sibling temp file that is then renamed over the record,
/// so a reader never sees a half-written blob.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Records live in `dir`, which is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `key`.
    pub fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl StorageBackend for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(key)(err)),
        }
    }

    fn store(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(key))?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, blob).map_err(io_error(key))?;
        fs::rename(&staging, &path).map_err(io_error(key))?;
        trace!(path = %path.display(), bytes = blob.len(), "record written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(key)(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_records() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.store("state", "{}").expect("store");
        assert_eq!(other.load("state").expect("load").as_deref(), Some("{}"));

        other.remove("state").expect("remove");
        assert!(storage.is_empty());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.load("state").expect("load"), None);
        storage.store("state", r#"{"a":1}"#).expect("store");
        storage.store("state", r#"{"a":2}"#).expect("overwrite");
        assert_eq!(storage.load("state").expect("load").as_deref(), Some(r#"{"a":2}"#));
        assert!(dir.path().join("nested/state.json").is_file());
        assert!(!dir.path().join("nested/state.json.tmp").exists());

        storage.remove("state").expect("remove");
        storage.remove("state").expect("remove missing");
        assert_eq!(storage.load("state").expect("load"), None);
    }

    #[test]
    fn file_rejects_path_like_keys() {
        let storage = FileStorage::new("unused");
        for key in ["", "../x", ".hidden", "a/b", "a b"] {
            assert!(
                matches!(storage.record_path(key), Err(StorageError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
        assert!(storage.record_path("state-v2").is_ok());
    }
}
