// Queue / Worker configuration

use super::error::{DomainError, Result};

/// Resolved queue identifier (an SQS queue URL)
pub type QueueUrl = String;

/// Largest batch a single receive call may return (SQS limit)
pub const MAX_MESSAGES_LIMIT: u32 = 10;

/// Longest long-poll a single receive call may block (SQS limit)
pub const MAX_WAIT_TIME_SECONDS: u32 = 20;

/// Per-queue worker configuration
///
/// The queue URL is not part of the configuration: the worker resolves it
/// exactly once at construction and keeps it immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub queue_name: String,
    pub max_messages: u32,
    pub wait_time_seconds: u32,
}

impl WorkerConfig {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            max_messages: MAX_MESSAGES_LIMIT,
            wait_time_seconds: MAX_WAIT_TIME_SECONDS,
        }
    }

    pub fn with_max_messages(mut self, max_messages: u32) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_wait_time_seconds(mut self, wait_time_seconds: u32) -> Self {
        self.wait_time_seconds = wait_time_seconds;
        self
    }

    /// Check the configuration against the transport limits
    pub fn validate(&self) -> Result<()> {
        if self.queue_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Queue name cannot be empty".to_string(),
            ));
        }

        if self.max_messages == 0 || self.max_messages > MAX_MESSAGES_LIMIT {
            return Err(DomainError::ValidationError(format!(
                "max_messages must be between 1 and {}, got {}",
                MAX_MESSAGES_LIMIT, self.max_messages
            )));
        }

        if self.wait_time_seconds > MAX_WAIT_TIME_SECONDS {
            return Err(DomainError::ValidationError(format!(
                "wait_time_seconds must be at most {}, got {}",
                MAX_WAIT_TIME_SECONDS, self.wait_time_seconds
            )));
        }

        Ok(())
    }
}
