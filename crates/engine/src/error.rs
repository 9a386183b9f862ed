use bridaldesk_core::CoreError;
use bridaldesk_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("field is locked: {0}")]
    FieldLocked(String),

    #[error("field is derived and cannot be edited: {0}")]
    DerivedField(String),

    #[error("not a list field: {0}")]
    NotAListField(String),

    #[error("item {id} not found in {field}")]
    ItemNotFound { field: String, id: u64 },

    #[error("validation failed: {0}")]
    Validation(String),
}
