use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("invalid list item: {0}")]
    InvalidItem(String),

    #[error("invalid amount in field {field}: {value}")]
    InvalidAmount { field: String, value: String },

    #[error("amount out of range: {0}")]
    AmountOverflow(String),

    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),

    #[error("attachment too large: {size} bytes (max {max})")]
    AttachmentTooLarge { size: usize, max: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
