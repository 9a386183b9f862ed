use std::cell::RefCell;

use bridaldesk_core::{Notice, NoticeVariant, Notifier};

/// Notifier that keeps every notice for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }

    pub fn count(&self, variant: NoticeVariant) -> usize {
        self.notices
            .borrow()
            .iter()
            .filter(|n| n.variant == variant)
            .count()
    }

    pub fn clear(&self) {
        self.notices.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
