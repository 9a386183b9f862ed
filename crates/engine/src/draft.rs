use tracing::{debug, warn};

use bridaldesk_core::{FieldValue, Snapshot, StorageKey};
use bridaldesk_storage::KeyedStore;

/// In-memory copy of one field group for one entity.
///
/// Mutations here never persist on their own; the owning session decides
/// when the snapshot is written.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftState {
    fields: Snapshot,
}

impl DraftState {
    pub fn new(fields: Snapshot) -> Self {
        Self { fields }
    }

    /// Seed from the stored snapshot under `key`, filling fields the stored
    /// copy lacks from `defaults`. Absent, corrupt or unreadable payloads
    /// fall back to `defaults` alone.
    pub fn hydrate(store: &dyn KeyedStore, key: &StorageKey, defaults: &Snapshot) -> Self {
        let mut fields = defaults.clone();
        match store.read(key) {
            Ok(Some(stored)) => {
                debug!(key = %key, fields = stored.len(), "draft hydrated from store");
                fields.extend(stored);
            }
            Ok(None) => {
                debug!(key = %key, "no stored draft; using defaults");
            }
            Err(e) => {
                warn!(key = %key, error = %e, "draft read failed; using defaults");
            }
        }
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Replace one field. Returns the previous value.
    pub fn set(&mut self, field: &str, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(field.to_string(), value)
    }

    pub fn has_value(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|v| !v.is_empty())
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
