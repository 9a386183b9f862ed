use std::rc::Rc;

use bridaldesk_core::{EntityKey, ManualClock, Snapshot, StorageKey};
use bridaldesk_engine::{Desk, EngineConfig, FormSession};
use bridaldesk_storage::{KeyedStore, MemoryStore, StorageError};

use crate::notices::RecordingNotifier;

/// A desk over an in-memory store, a manual clock and a recording notifier.
pub struct TestDesk {
    pub desk: Desk,
    pub store: Rc<MemoryStore>,
    pub clock: Rc<ManualClock>,
    pub notices: Rc<RecordingNotifier>,
}

impl Default for TestDesk {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDesk {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = Rc::new(MemoryStore::with_capacity(config.store_capacity_bytes));
        Self::with_store(store, config)
    }

    /// A desk over an existing store, e.g. one shared with another tab.
    pub fn with_store(store: Rc<MemoryStore>, config: EngineConfig) -> Self {
        let clock = Rc::new(ManualClock::new(0));
        let notices = Rc::new(RecordingNotifier::new());
        let desk = Desk::new(store.clone(), clock.clone(), notices.clone(), config);
        Self {
            desk,
            store,
            clock,
            notices,
        }
    }

    pub fn open(&self, entity: impl Into<EntityKey>, group: &str) -> Result<FormSession, Box<dyn std::error::Error>> {
        Ok(self.desk.open(entity, group)?)
    }

    /// Move time forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.clock.advance(ms);
    }

    /// Move time past the configured quiet period and poll `session`.
    pub fn settle(&self, session: &mut FormSession) -> Option<bridaldesk_engine::SaveOutcome> {
        self.advance(self.desk.config().quiet_period_ms);
        session.poll()
    }

    pub fn stored(&self, group: &str, entity: impl Into<EntityKey>) -> Result<Option<Snapshot>, StorageError> {
        let key = StorageKey::new(group, &entity.into())?;
        self.store.read(&key)
    }

    pub fn seed(&self, group: &str, entity: impl Into<EntityKey>, snapshot: &Snapshot) -> Result<(), StorageError> {
        let key = StorageKey::new(group, &entity.into())?;
        self.store.write(&key, snapshot)
    }
}
