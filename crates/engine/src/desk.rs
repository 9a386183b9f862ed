use std::rc::Rc;

use tracing::info;

use bridaldesk_core::{Clock, CoreError, EntityKey, Notifier, StorageKey};
use bridaldesk_storage::{Collection, CollectionStore, KeyedStore};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::group::{self, GroupSpec};
use crate::session::{FormSession, SessionDeps};

/// Opens editing sessions over a shared draft store.
///
/// Drafts and backend records are two separate persistence paths: the desk
/// only consults records to confirm an entity exists, and never copies
/// draft fields into them.
pub struct Desk {
    deps: SessionDeps,
    collections: Option<Rc<dyn CollectionStore>>,
    groups: Vec<GroupSpec>,
}

impl Desk {
    pub fn new(
        store: Rc<dyn KeyedStore>,
        clock: Rc<dyn Clock>,
        notifier: Rc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        info!(quiet_period_ms = config.quiet_period_ms, "desk configured");
        Self {
            deps: SessionDeps {
                store,
                clock,
                notifier,
                config,
            },
            collections: None,
            groups: group::catalog(),
        }
    }

    /// A desk tuned from `BRIDALDESK_*` environment variables.
    pub fn from_env(store: Rc<dyn KeyedStore>, clock: Rc<dyn Clock>, notifier: Rc<dyn Notifier>) -> Self {
        Self::new(store, clock, notifier, EngineConfig::from_env())
    }

    pub fn with_collections(mut self, collections: Rc<dyn CollectionStore>) -> Self {
        self.collections = Some(collections);
        self
    }

    /// Register a group, replacing a catalog group of the same name.
    pub fn with_group(mut self, spec: GroupSpec) -> Self {
        self.groups.retain(|g| g.name != spec.name);
        self.groups.push(spec);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.deps.config
    }

    pub fn group(&self, name: &str) -> Result<&GroupSpec, EngineError> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| EngineError::UnknownGroup(name.to_string()))
    }

    pub fn open(&self, entity: impl Into<EntityKey>, group: &str) -> Result<FormSession, EngineError> {
        let spec = self.group(group)?.clone();
        let entity = entity.into();
        self.storage_key(&spec, &entity)?;
        FormSession::open(self.deps.clone(), entity, spec)
    }

    /// Key of `group` for `entity`, refusing keys that another registered
    /// group would also build. A key such as `fitting-photos-42` belongs to
    /// the longest group name that prefixes it, so `fitting` cannot reach it
    /// through an entity id like `photos-42`.
    pub fn storage_key(&self, group: &GroupSpec, entity: &EntityKey) -> Result<StorageKey, EngineError> {
        let key = StorageKey::new(&group.name, entity)?;
        let owner = self
            .groups
            .iter()
            .filter(|g| g.name.len() > group.name.len())
            .find(|g| {
                key.as_str()
                    .strip_prefix(g.name.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
            });
        if let Some(owner) = owner {
            return Err(CoreError::InvalidKey(format!(
                "{key} belongs to group {}, not {}",
                owner.name, group.name
            ))
            .into());
        }
        Ok(key)
    }

    /// Open a session for a backend record, failing when the record is gone.
    pub fn open_for_record(
        &self,
        collection: Collection,
        id: i64,
        group: &str,
    ) -> Result<FormSession, EngineError> {
        let Some(collections) = &self.collections else {
            return Err(EngineError::EntityNotFound(format!(
                "{}/{id}: no record store attached",
                collection.as_str()
            )));
        };
        if collections.get_record(collection, id)?.is_none() {
            return Err(EngineError::EntityNotFound(format!("{}/{id}", collection.as_str())));
        }
        self.open(EntityKey::Int(id), group)
    }

    /// Delete the stored draft of one group for one entity.
    pub fn discard(&self, entity: impl Into<EntityKey>, group: &str) -> Result<(), EngineError> {
        let spec = self.group(group)?;
        let key = self.storage_key(spec, &entity.into())?;
        self.deps.store.delete(&key)?;
        info!(key = %key, "draft discarded");
        Ok(())
    }
}
