// Message Handler Port
// Business logic supplied by the caller, one call per delivered message

use crate::domain::{DomainError, Message};
use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

/// Handler errors
///
/// Every variant means the same thing to the worker: redeliver later.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("[Invalid Event: {event}] {message}")]
    InvalidEvent { event: String, message: String },

    #[error("Handler failed: {0}")]
    Failed(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn invalid_event(event: impl Into<String>, message: impl Into<String>) -> Self {
        HandlerError::InvalidEvent {
            event: event.into(),
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

impl From<DomainError> for HandlerError {
    fn from(err: DomainError) -> Self {
        HandlerError::Failed(err.to_string())
    }
}

/// Result of handling one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Delete the message
    Success,
    /// Keep the message and push its next delivery out by the backoff delay
    Failure(HandlerError),
}

impl From<Result<(), HandlerError>> for Outcome {
    fn from(result: Result<(), HandlerError>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::Failure(e),
        }
    }
}

/// Message Handler trait
///
/// One handler is attached per worker, and is shared by every concurrent
/// dispatch task of that worker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &Message) -> Result<(), HandlerError>;
}

/// Adapter turning an async closure into a [`MessageHandler`]
///
/// The closure receives its own copy of the message so the returned future
/// can be `'static`.
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap an async closure as a handler
///
/// ```text
/// let handler = handler_fn(|msg: Message| async move {
///     tracing::info!(message_id = %msg.message_id, "got message");
///     Ok(())
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> MessageHandler for HandlerFn<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        (self.f)(message.clone()).await
    }
}
