// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Only construction-time failures surface through this type. Everything that
/// goes wrong inside the poll loop is logged where it happens and never
/// propagated.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Queue error: {0}")]
    Queue(#[from] crate::port::QueueError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
