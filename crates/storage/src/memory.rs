use std::cell::RefCell;
use std::collections::HashMap;

use tracing::{debug, warn};

use bridaldesk_core::{Snapshot, StorageKey};

use crate::error::StorageError;
use crate::traits::KeyedStore;

/// Default capacity, in bytes of stored text (key plus payload).
pub const DEFAULT_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

/// In-process store keeping each snapshot as JSON text, with a total
/// byte quota in the manner of browser local storage.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    capacity: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY_BYTES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently used by keys and payloads.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// The raw stored text under `key`.
    pub fn raw(&self, key: &StorageKey) -> Option<String> {
        self.entries.borrow().get(key.as_str()).cloned()
    }

    /// Store text verbatim, bypassing serialization and quota. Lets callers
    /// plant payloads written by other code, including malformed ones.
    pub fn insert_raw(&self, key: &StorageKey, raw: impl Into<String>) {
        self.entries
            .borrow_mut()
            .insert(key.as_str().to_string(), raw.into());
    }
}

impl KeyedStore for MemoryStore {
    fn read(&self, key: &StorageKey) -> Result<Option<Snapshot>, StorageError> {
        let entries = self.entries.borrow();
        let Some(raw) = entries.get(key.as_str()) else {
            return Ok(None);
        };
        match serde_json::from_str::<Snapshot>(raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!(key = %key, error = %e, "discarding corrupt stored snapshot");
                Ok(None)
            }
        }
    }

    fn write(&self, key: &StorageKey, snapshot: &Snapshot) -> Result<(), StorageError> {
        // Serialize fully before touching the map so a failure leaves the
        // previous value in place.
        let payload = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut entries = self.entries.borrow_mut();
        let others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key.as_str())
            .map(|(k, v)| k.len() + v.len())
            .sum();
        let needed = others + key.as_str().len() + payload.len();
        if needed > self.capacity {
            warn!(key = %key, needed, capacity = self.capacity, "store quota exceeded");
            return Err(StorageError::QuotaExceeded {
                needed,
                capacity: self.capacity,
            });
        }

        debug!(key = %key, bytes = payload.len(), "snapshot written");
        entries.insert(key.as_str().to_string(), payload);
        Ok(())
    }

    fn delete(&self, key: &StorageKey) -> Result<(), StorageError> {
        if self.entries.borrow_mut().remove(key.as_str()).is_some() {
            debug!(key = %key, "snapshot deleted");
        }
        Ok(())
    }
}
