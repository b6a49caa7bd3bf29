#![forbid(unsafe_code)]

//! The persistent store.
//!
//! # Invariants
//!
//! 1. The first read of a key whose stored value is absent returns the
//!    default for that key, without writing it back.
//! 2. Any other read returns the stored value (absent stays absent).
//! 3. Every write serializes the whole object to the backend before
//!    returning.
//! 4. `keys()` lists every declared default, populated or not.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::PersistError;
use super::storage::StorageBackend;

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A typed JSON object persisted under one storage key.
///
/// `T` describes the full state; its serialized fields are the store's
/// defaults and declared keys.
pub struct PersistentStore<T> {
    storage_key: String,
    defaults: Map<String, Value>,
    values: Map<String, Value>,
    seen: RefCell<HashSet<String>>,
    backend: Box<dyn StorageBackend>,
    _state: PhantomData<fn(&T)>,
}

impl<T: Serialize> PersistentStore<T> {
    /// Open the record `storage_key` in `backend`.
    ///
    /// A missing, unreadable or malformed record starts the store empty; the
    /// problem is logged, not returned. Defaults that are not a JSON object
    /// are a configuration error.
    pub fn new(
        storage_key: impl Into<String>,
        defaults: &T,
        backend: impl StorageBackend + 'static,
    ) -> Result<Self, PersistError> {
        let storage_key = storage_key.into();
        let defaults = match serde_json::to_value(defaults)? {
            Value::Object(map) => map,
            other => return Err(PersistError::DefaultsNotObject(kind(&other))),
        };
        let values = load_record(&storage_key, &backend);
        debug!(
            key = %storage_key,
            stored = values.len(),
            declared = defaults.len(),
            "persistent store opened"
        );
        Ok(Self {
            storage_key,
            defaults,
            values,
            seen: RefCell::new(HashSet::new()),
            backend: Box::new(backend),
            _state: PhantomData,
        })
    }

    /// Read `key`, substituting its default on the first read of an unset key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let first_read = self.seen.borrow_mut().insert(key.to_string());
        match self.values.get(key) {
            Some(value) => Some(value.clone()),
            None if first_read => self.defaults.get(key).cloned(),
            None => None,
        }
    }

    /// [`get`](Self::get), decoded into `V`.
    pub fn get_as<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>, PersistError> {
        Ok(self.get(key).map(serde_json::from_value).transpose()?)
    }

    /// Write `key` and persist the whole object.
    ///
    /// A backend failure is returned, but the in-memory value is already
    /// updated.
    pub fn set<V: Serialize + ?Sized>(&mut self, key: &str, value: &V) -> Result<(), PersistError> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    /// Write every field of `snapshot`, persisting once.
    pub fn assign(&mut self, snapshot: &T) -> Result<(), PersistError> {
        let fields = match serde_json::to_value(snapshot)? {
            Value::Object(map) => map,
            other => return Err(PersistError::SnapshotNotObject(kind(&other))),
        };
        self.values.extend(fields);
        self.persist()
    }

    /// Clear `key` back to its default.
    ///
    /// The stored value is dropped and the key counts as never read, so the
    /// next [`get`](Self::get) yields the default again. Returns the value
    /// that was stored.
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, PersistError> {
        let previous = self.values.remove(key);
        self.seen.borrow_mut().remove(key);
        self.persist()?;
        Ok(previous)
    }

    /// Declared keys, in declaration order, whether populated or not.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.defaults.keys().map(String::as_str)
    }

    /// Whether `key` is declared or present in storage.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.defaults.contains_key(key) || self.values.contains_key(key)
    }

    /// The blob written to storage.
    #[must_use]
    pub fn to_json(&self) -> String {
        Value::Object(self.values.clone()).to_string()
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn persist(&self) -> Result<(), PersistError> {
        self.backend.store(&self.storage_key, &self.to_json())?;
        Ok(())
    }
}

fn load_record(storage_key: &str, backend: &dyn StorageBackend) -> Map<String, Value> {
    let blob = match backend.load(storage_key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return Map::new(),
        Err(err) => {
            warn!(key = %storage_key, error = %err, "stored state unreadable; starting empty");
            return Map::new();
        }
    };
    match serde_json::from_str::<Value>(&blob) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(key = %storage_key, found = kind(&other), "stored state is not an object; starting empty");
            Map::new()
        }
        Err(err) => {
            warn!(key = %storage_key, error = %err, "stored state is not valid JSON; starting empty");
            Map::new()
        }
    }
}

impl<T> fmt::Debug for PersistentStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentStore")
            .field("storage_key", &self.storage_key)
            .field("values", &self.values)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
