//! Editing session for one field group of one entity.
//!
//! A session owns the draft, the per-field lock states and the debounce
//! timer. Field edits are written after the quiet period; list row
//! actions are written immediately. The session is driven by the caller's
//! event loop through [`FormSession::poll`].

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, info, warn};

use bridaldesk_core::{
    Clock, EntityKey, FieldValue, ImageAttachment, ItemId, ListItem, Notice, Notifier,
    PaymentSummary, SessionId, Snapshot, StorageKey, decode_items, encode_items, parse_amount,
};
use bridaldesk_storage::KeyedStore;

use crate::autosave::AutosaveController;
use crate::config::EngineConfig;
use crate::draft::DraftState;
use crate::error::EngineError;
use crate::group::{GroupSpec, LedgerSpec, ListSpec};
use crate::ledger;
use crate::list_ops;
use crate::lock::{FieldLock, LockMap};

/// Result of one write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Snapshot written; the listed fields went back to locked.
    Saved { relocked: Vec<String> },
    /// Write failed; the draft is intact but not durable.
    Failed { reason: String },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// The list after a row action, and whether it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListChange {
    pub items: Vec<ListItem>,
    pub id: Option<ItemId>,
    pub persisted: bool,
}

/// Collaborators shared by every session a desk opens.
#[derive(Clone)]
pub(crate) struct SessionDeps {
    pub(crate) store: Rc<dyn KeyedStore>,
    pub(crate) clock: Rc<dyn Clock>,
    pub(crate) notifier: Rc<dyn Notifier>,
    pub(crate) config: EngineConfig,
}

enum RowAction {
    Append,
    Update,
    Remove,
}

impl RowAction {
    fn failure_title(&self) -> &'static str {
        match self {
            Self::Append => "Cannot add row",
            Self::Update => "Cannot update row",
            Self::Remove => "Cannot remove row",
        }
    }
}

pub struct FormSession {
    id: SessionId,
    entity: EntityKey,
    key: StorageKey,
    group: GroupSpec,
    draft: DraftState,
    locks: LockMap,
    autosave: AutosaveController,
    summary: Option<PaymentSummary>,
    deps: SessionDeps,
}

impl FormSession {
    pub(crate) fn open(deps: SessionDeps, entity: EntityKey, group: GroupSpec) -> Result<Self, EngineError> {
        let key = StorageKey::new(&group.name, &entity)?;
        let mut draft = DraftState::hydrate(deps.store.as_ref(), &key, &group.defaults);

        let summary = match &group.ledger {
            Some(spec) => match ledger::refresh(spec, &mut draft) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(key = %key, error = %e, "stored payments unreadable; summary unavailable");
                    None
                }
            },
            None => None,
        };

        let locks = LockMap::from_draft(&draft);
        let id = SessionId::new();
        debug!(session = %id, key = %key, "session opened");

        Ok(Self {
            id,
            entity,
            key,
            autosave: AutosaveController::new(deps.config.quiet_period_ms),
            group,
            draft,
            locks,
            summary,
            deps,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn entity(&self) -> &EntityKey {
        &self.entity
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn group(&self) -> &GroupSpec {
        &self.group
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.draft.snapshot()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.draft.get(field)
    }

    pub fn lock_state(&self, field: &str) -> FieldLock {
        self.locks.state(field)
    }

    pub fn is_write_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn write_deadline(&self) -> Option<u64> {
        self.autosave.deadline()
    }

    /// Current payment totals, for groups that keep a ledger.
    pub fn summary(&self) -> Option<PaymentSummary> {
        self.summary
    }

    pub fn unlock(&mut self, field: &str) -> bool {
        self.locks.unlock(field)
    }

    pub fn lock(&mut self, field: &str) -> bool {
        self.locks.lock(field, &self.draft)
    }

    // ========================================================================
    // Field edits (debounced)
    // ========================================================================

    /// Apply an edit in memory and (re)start the quiet period.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), EngineError> {
        let value = value.into();
        if self.group.ledger.is_some() && LedgerSpec::is_derived(field) {
            return Err(EngineError::DerivedField(field.to_string()));
        }
        if self.group.list(field).is_some() {
            return Err(EngineError::Validation(format!(
                "{field} is a list; use the row actions"
            )));
        }
        if !self.locks.state(field).is_editable() {
            return Err(EngineError::FieldLocked(field.to_string()));
        }

        match self.group.ledger.clone() {
            Some(spec) if spec.total_field == field => {
                if let Err(e) = parse_amount(field, &value) {
                    self.notify(Notice::destructive("Invalid amount", e.to_string()));
                    return Err(EngineError::Validation(e.to_string()));
                }
                // Stage on a copy: unreadable payment rows must not leave a
                // half-applied total behind.
                let mut next = self.draft.clone();
                next.set(field, value);
                match ledger::refresh(&spec, &mut next) {
                    Ok(summary) => {
                        self.draft = next;
                        self.summary = Some(summary);
                    }
                    Err(e) => {
                        self.notify(Notice::destructive("Total not updated", e.to_string()));
                        return Err(e);
                    }
                }
            }
            _ => {
                self.draft.set(field, value);
            }
        }

        self.locks.mark_edited(field);
        self.autosave.schedule(self.deps.clock.now_ms());
        Ok(())
    }

    /// Validate a captured image and store it as a field value.
    pub fn set_image(&mut self, field: &str, data_url: &str) -> Result<(), EngineError> {
        let image = match ImageAttachment::from_data_url(data_url, self.deps.config.max_image_bytes) {
            Ok(image) => image,
            Err(e) => {
                self.notify(Notice::destructive("Image rejected", e.to_string()));
                return Err(e.into());
            }
        };
        self.set(field, image.into_value())
    }

    /// Write the draft if the quiet period has elapsed since the last edit.
    pub fn poll(&mut self) -> Option<SaveOutcome> {
        if !self.autosave.take_due(self.deps.clock.now_ms()) {
            return None;
        }
        Some(self.persist("Saved"))
    }

    /// Write a pending draft now instead of waiting for the quiet period.
    pub fn flush(&mut self) -> Option<SaveOutcome> {
        if !self.autosave.cancel() {
            return None;
        }
        Some(self.persist("Saved"))
    }

    /// End the session. A write still waiting for its quiet period is
    /// dropped, as when the user navigates away mid-edit.
    pub fn close(self) {
        if self.autosave.is_pending() {
            debug!(session = %self.id, key = %self.key, pending = ?self.locks.pending_fields(), "session closed with unsaved edits");
        }
    }

    // ========================================================================
    // List rows (persisted immediately)
    // ========================================================================

    pub fn items(&self, field: &str) -> Result<Vec<ListItem>, EngineError> {
        self.list_spec(field)?;
        match self.draft.get(field) {
            Some(value) => Ok(decode_items(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn append_item(
        &mut self,
        field: &str,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<ListChange, EngineError> {
        let prepared = self.list_spec(field).and_then(|spec| {
            let items = self.items(field)?;
            list_ops::append(&spec, &items, fields)
        });
        match prepared {
            Ok((items, id)) => self.commit_rows(field, items, Some(id), &RowAction::Append),
            Err(e) => Err(self.reject(&RowAction::Append, e)),
        }
    }

    pub fn update_item(
        &mut self,
        field: &str,
        id: ItemId,
        patch: BTreeMap<String, FieldValue>,
    ) -> Result<ListChange, EngineError> {
        let prepared = self.list_spec(field).and_then(|spec| {
            let items = self.items(field)?;
            list_ops::update(&spec, &items, id, patch)
        });
        match prepared {
            Ok(items) => self.commit_rows(field, items, Some(id), &RowAction::Update),
            Err(e) => Err(self.reject(&RowAction::Update, e)),
        }
    }

    pub fn remove_item(&mut self, field: &str, id: ItemId) -> Result<ListChange, EngineError> {
        let prepared = self.list_spec(field).and_then(|spec| {
            let items = self.items(field)?;
            list_ops::remove(&spec, &items, id)
        });
        match prepared {
            Ok(items) => self.commit_rows(field, items, Some(id), &RowAction::Remove),
            Err(e) => Err(self.reject(&RowAction::Remove, e)),
        }
    }

    fn list_spec(&self, field: &str) -> Result<ListSpec, EngineError> {
        self.group
            .list(field)
            .cloned()
            .ok_or_else(|| EngineError::NotAListField(field.to_string()))
    }

    fn commit_rows(
        &mut self,
        field: &str,
        items: Vec<ListItem>,
        id: Option<ItemId>,
        action: &RowAction,
    ) -> Result<ListChange, EngineError> {
        // Stage on a copy so a ledger that cannot be recomputed leaves the
        // draft untouched.
        let encoded = match encode_items(&items) {
            Ok(encoded) => encoded,
            Err(e) => return Err(self.reject(action, e.into())),
        };
        let mut next = self.draft.clone();
        next.set(field, encoded);
        let summary = match &self.group.ledger {
            Some(spec) if spec.list_field == field => match ledger::refresh(spec, &mut next) {
                Ok(summary) => Some(summary),
                Err(e) => return Err(self.reject(action, e)),
            },
            _ => self.summary,
        };

        self.draft = next;
        self.summary = summary;

        // The whole snapshot goes out now, which also covers any field
        // edit still waiting on the debounce timer.
        self.autosave.cancel();
        let outcome = self.persist("Row saved");
        Ok(ListChange {
            items,
            id,
            persisted: outcome.is_saved(),
        })
    }

    fn reject(&self, action: &RowAction, error: EngineError) -> EngineError {
        self.notify(Notice::destructive(action.failure_title(), error.to_string()));
        error
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    fn persist(&mut self, success_title: &str) -> SaveOutcome {
        match self.deps.store.write(&self.key, self.draft.snapshot()) {
            Ok(()) => {
                let relocked = self.locks.settle_after_write(&self.draft);
                info!(session = %self.id, key = %self.key, relocked = relocked.len(), "draft saved");
                self.notify(Notice::success(success_title, format!("{} saved", self.group.name)));
                SaveOutcome::Saved { relocked }
            }
            Err(e) => {
                self.locks.settle_after_failure();
                warn!(session = %self.id, key = %self.key, error = %e, "draft write failed");
                self.notify(Notice::destructive(
                    "Not saved",
                    format!("Your change is visible now but may not survive a refresh: {e}"),
                ));
                SaveOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn notify(&self, notice: Notice) {
        self.deps
            .notifier
            .notify(notice.with_duration(self.deps.config.notice_duration_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridaldesk_core::{ManualClock, NoticeVariant, snapshot};
    use bridaldesk_storage::MemoryStore;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Notice>>);

    impl Notifier for Recorder {
        fn notify(&self, notice: Notice) {
            self.0.borrow_mut().push(notice);
        }
    }

    struct Fixture {
        store: Rc<MemoryStore>,
        clock: Rc<ManualClock>,
        notices: Rc<Recorder>,
    }

    impl Fixture {
        fn new(capacity: usize) -> Self {
            Self {
                store: Rc::new(MemoryStore::with_capacity(capacity)),
                clock: Rc::new(ManualClock::new(0)),
                notices: Rc::new(Recorder::default()),
            }
        }

        fn open(&self, group: GroupSpec) -> FormSession {
            let deps = SessionDeps {
                store: self.store.clone(),
                clock: self.clock.clone(),
                notifier: self.notices.clone(),
                config: EngineConfig::default(),
            };
            FormSession::open(deps, EntityKey::Int(42), group).unwrap()
        }
    }

    fn detail() -> GroupSpec {
        GroupSpec::new("detail", snapshot([("readyDekorasi", ""), ("catatan", "")]))
    }

    #[test]
    fn edit_waits_for_quiet_period() {
        let fx = Fixture::new(1 << 20);
        let mut session = fx.open(detail());
        session.set("readyDekorasi", "2024-06-01").unwrap();
        assert_eq!(session.lock_state("readyDekorasi"), FieldLock::PendingWrite);

        fx.clock.advance(999);
        assert_eq!(session.poll(), None);
        assert!(fx.store.is_empty());

        fx.clock.advance(1);
        assert!(session.poll().unwrap().is_saved());
        assert_eq!(session.lock_state("readyDekorasi"), FieldLock::Locked);
        assert_eq!(session.poll(), None);
    }

    #[test]
    fn locked_field_rejects_edit_until_unlocked() {
        let fx = Fixture::new(1 << 20);
        let key = StorageKey::new("detail", &EntityKey::Int(42)).unwrap();
        fx.store.write(&key, &snapshot([("catatan", "sudah DP")])).unwrap();

        let mut session = fx.open(detail());
        assert!(matches!(session.set("catatan", "x"), Err(EngineError::FieldLocked(_))));
        assert!(session.unlock("catatan"));
        session.set("catatan", "lunas").unwrap();
    }

    #[test]
    fn failed_write_keeps_draft_and_notifies() {
        let fx = Fixture::new(40);
        let mut session = fx.open(detail());
        session.set("catatan", "a very long note that cannot fit in the quota").unwrap();
        fx.clock.advance(1_000);
        let outcome = session.poll().unwrap();
        assert!(matches!(outcome, SaveOutcome::Failed { .. }));
        assert_eq!(
            session.get("catatan"),
            Some(&FieldValue::text("a very long note that cannot fit in the quota"))
        );
        assert_eq!(session.lock_state("catatan"), FieldLock::Editing);
        let notices = fx.notices.0.borrow();
        assert_eq!(notices.last().unwrap().variant, NoticeVariant::Destructive);
    }

    #[test]
    fn list_fields_are_not_set_directly() {
        let fx = Fixture::new(1 << 20);
        let mut session = fx.open(GroupSpec::new("clothes-list", Snapshot::new()).with_list(ListSpec::new("items", &["nama"])));
        assert!(matches!(
            session.set("items", FieldValue::List(vec![])),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(session.items("nope"), Err(EngineError::NotAListField(_))));
    }

    #[test]
    fn flush_writes_pending_edit_now() {
        let fx = Fixture::new(1 << 20);
        let mut session = fx.open(detail());
        assert_eq!(session.flush(), None);
        session.set("catatan", "x").unwrap();
        assert!(session.flush().unwrap().is_saved());
        assert!(!session.is_write_pending());
        assert!(!fx.store.is_empty());
    }
}
