/// Debounce timer for one (entity, group) draft.
///
/// Holds at most one deadline. Scheduling again replaces it outright, so a
/// burst of edits produces a single write once the quiet period passes
/// without further edits.
#[derive(Debug, Clone)]
pub struct AutosaveController {
    quiet_period_ms: u64,
    deadline: Option<u64>,
}

impl AutosaveController {
    pub fn new(quiet_period_ms: u64) -> Self {
        Self {
            quiet_period_ms,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.quiet_period_ms));
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.deadline.is_some_and(|d| now_ms >= d)
    }

    /// Clears and reports the deadline if it has passed.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.deadline = None;
            return true;
        }
        false
    }
}
