use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage quota exceeded: need {needed} bytes, capacity {capacity}")]
    QuotaExceeded { needed: usize, capacity: usize },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("core error: {0}")]
    Core(#[from] bridaldesk_core::CoreError),
}
