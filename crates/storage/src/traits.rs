use bridaldesk_core::{Snapshot, StorageKey};

use crate::error::StorageError;

/// Flat key/value surface holding one snapshot per storage key.
///
/// No transactions across keys and no expiry. Concurrent writers to the
/// same key are not coordinated: the last write wins.
pub trait KeyedStore {
    /// The snapshot last written under `key`. A payload that can no longer
    /// be decoded reads as absent (and is logged), never as an error.
    fn read(&self, key: &StorageKey) -> Result<Option<Snapshot>, StorageError>;

    /// Replace whatever is stored under `key`. On failure the previous
    /// value stays readable.
    fn write(&self, key: &StorageKey, snapshot: &Snapshot) -> Result<(), StorageError>;

    fn delete(&self, key: &StorageKey) -> Result<(), StorageError>;
}

/// Business record collections of the dashboard's database service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Clients,
    Events,
    VendorBookings,
    TeamMembers,
    Rentals,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Self::Clients,
        Self::Events,
        Self::VendorBookings,
        Self::TeamMembers,
        Self::Rentals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Events => "events",
            Self::VendorBookings => "vendor_bookings",
            Self::TeamMembers => "team_members",
            Self::Rentals => "rentals",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StorageError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StorageError::Serialization(format!("unknown collection: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub body: Snapshot,
}

/// add/get/get_all/update/delete over named collections, with ids
/// assigned by the store.
///
/// Unrelated to [`KeyedStore`] drafts: nothing keeps the two in sync.
pub trait CollectionStore {
    fn add_record(&self, collection: Collection, body: &Snapshot) -> Result<i64, StorageError>;

    fn get_record(&self, collection: Collection, id: i64) -> Result<Option<Record>, StorageError>;

    fn get_all_records(&self, collection: Collection) -> Result<Vec<Record>, StorageError>;

    /// Replace the body of an existing record. Fails with `NotFound` when
    /// the id does not exist.
    fn update_record(&self, collection: Collection, id: i64, body: &Snapshot) -> Result<(), StorageError>;

    /// Returns whether a record was removed.
    fn delete_record(&self, collection: Collection, id: i64) -> Result<bool, StorageError>;
}
