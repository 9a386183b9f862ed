use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTICE_DURATION_MS: u64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeVariant {
    Success,
    Destructive,
}

impl NoticeVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Destructive => "destructive",
        }
    }
}

/// A transient, user-visible status message (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
    pub duration_ms: u64,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Success,
            duration_ms: DEFAULT_NOTICE_DURATION_MS,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
            duration_ms: DEFAULT_NOTICE_DURATION_MS,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Fire-and-forget sink for notices.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}
