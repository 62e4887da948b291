// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Missing attribute {attribute} on message {message_id}")]
    MissingAttribute {
        message_id: String,
        attribute: String,
    },

    #[error("Malformed attribute {attribute} on message {message_id}: {value:?}")]
    MalformedAttribute {
        message_id: String,
        attribute: String,
        value: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
