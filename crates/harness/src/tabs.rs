use std::rc::Rc;

use bridaldesk_engine::EngineConfig;
use bridaldesk_storage::MemoryStore;

use crate::TestDesk;

/// Several desks sharing one store, like browser tabs over one local storage.
pub struct TestTabs {
    store: Rc<MemoryStore>,
    config: EngineConfig,
    tabs: Vec<TestDesk>,
}

impl Default for TestTabs {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTabs {
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            store: Rc::new(MemoryStore::with_capacity(config.store_capacity_bytes)),
            config,
            tabs: Vec::new(),
        }
    }

    pub fn add_tab(&mut self) -> usize {
        let index = self.tabs.len();
        self.tabs
            .push(TestDesk::with_store(self.store.clone(), self.config));
        index
    }

    pub fn tab(&self, index: usize) -> &TestDesk {
        &self.tabs[index]
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}
