use std::collections::BTreeMap;

use crate::draft::DraftState;

/// Edit state of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLock {
    /// Holds a saved value; shown read-only until unlocked.
    Locked,
    /// Editable, with no unsaved change.
    Editing,
    /// Edited since the last successful write.
    PendingWrite,
}

impl FieldLock {
    pub fn is_editable(&self) -> bool {
        !matches!(self, Self::Locked)
    }
}

/// Per-field lock states for one draft.
///
/// Fields without an entry are treated by their value: locked when they
/// hold something, editable when empty.
#[derive(Debug, Clone, Default)]
pub struct LockMap {
    states: BTreeMap<String, FieldLock>,
}

impl LockMap {
    /// Initial states: every field holding a value starts locked.
    pub fn from_draft(draft: &DraftState) -> Self {
        let states = draft
            .field_names()
            .map(|name| {
                let state = if draft.has_value(name) {
                    FieldLock::Locked
                } else {
                    FieldLock::Editing
                };
                (name.to_string(), state)
            })
            .collect();
        Self { states }
    }

    pub fn state(&self, field: &str) -> FieldLock {
        self.states.get(field).copied().unwrap_or(FieldLock::Editing)
    }

    /// Locked → Editing. Returns whether the state changed.
    pub fn unlock(&mut self, field: &str) -> bool {
        match self.state(field) {
            FieldLock::Locked => {
                self.states.insert(field.to_string(), FieldLock::Editing);
                true
            }
            FieldLock::Editing | FieldLock::PendingWrite => false,
        }
    }

    /// Manually return an editing field to locked, if it holds a value.
    pub fn lock(&mut self, field: &str, draft: &DraftState) -> bool {
        if self.state(field) == FieldLock::Editing && draft.has_value(field) {
            self.states.insert(field.to_string(), FieldLock::Locked);
            return true;
        }
        false
    }

    /// Record an edit. Callers check `is_editable` first.
    pub fn mark_edited(&mut self, field: &str) {
        self.states.insert(field.to_string(), FieldLock::PendingWrite);
    }

    /// After a successful write every unlocked field that now holds a value
    /// locks again; empty ones stay editable.
    pub fn settle_after_write(&mut self, draft: &DraftState) -> Vec<String> {
        let mut relocked = Vec::new();
        for (field, state) in self.states.iter_mut() {
            if *state == FieldLock::Locked {
                continue;
            }
            if draft.has_value(field) {
                *state = FieldLock::Locked;
                relocked.push(field.clone());
            } else {
                *state = FieldLock::Editing;
            }
        }
        relocked
    }

    /// After a failed write pending fields stay editable so the next edit
    /// schedules another attempt.
    pub fn settle_after_failure(&mut self) {
        for state in self.states.values_mut() {
            if *state == FieldLock::PendingWrite {
                *state = FieldLock::Editing;
            }
        }
    }

    pub fn pending_fields(&self) -> Vec<&str> {
        self.states
            .iter()
            .filter(|(_, s)| **s == FieldLock::PendingWrite)
            .map(|(f, _)| f.as_str())
            .collect()
    }
}
