// Queue Port (Interface)
// Abstraction over the managed queue transport (SQS in production)

use crate::domain::{Message, QueueUrl};
use async_trait::async_trait;
use thiserror::Error;

/// Queue transport errors
///
/// The set of kinds is closed so callers can branch on retry-vs-fatal without
/// inspecting provider-specific messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Network, timeout or malformed-response failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Queue (or receipt handle) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by rate limiting
    #[error("Throttled: {0}")]
    Throttled(String),

    #[error("Unknown queue error: {0}")]
    Unknown(String),
}

impl QueueError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueueError::NotFound(_))
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, QueueError::Throttled(_))
    }
}

/// Queue Port trait
///
/// Implementations must be safe to share between every worker and every
/// in-flight dispatch task.
#[async_trait]
pub trait QueuePort: Send + Sync {
    /// Resolve a queue name to the identifier used by every other call
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<QueueUrl, QueueError>;

    /// Receive up to `max_messages`, blocking at most `wait_time_seconds`
    ///
    /// All system attributes are requested, so the redelivery counter is
    /// always present on well-formed deliveries.
    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<Message>, QueueError>;

    /// Delete one delivered message
    async fn delete_message(&self, queue_url: &str, receipt_handle: &str)
        -> Result<(), QueueError>;

    /// Replace the remaining invisibility window of one delivered message
    async fn change_message_visibility(
        &self,
        queue_url: &str,
        receipt_handle: &str,
        visibility_timeout_seconds: u64,
    ) -> Result<(), QueueError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::application::worker::ShutdownSender;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// A single call observed by the mock, in arrival order
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum QueueCall {
        Resolve(String),
        Receive {
            max_messages: u32,
            wait_time_seconds: u32,
        },
        Delete(String),
        ChangeVisibility {
            receipt_handle: String,
            visibility_timeout_seconds: u64,
        },
    }

    /// In-memory queue port
    ///
    /// Serves scripted receive results in order. Once the script is drained it
    /// fires the optional shutdown sender and keeps returning empty batches
    /// after a short simulated long-poll.
    pub struct MockQueuePort {
        queue_url: Result<QueueUrl, QueueError>,
        script: Mutex<VecDeque<Result<Vec<Message>, QueueError>>>,
        calls: Mutex<Vec<QueueCall>>,
        shutdown_on_drain: Mutex<Option<ShutdownSender>>,
        delete_error: Option<QueueError>,
        visibility_error: Option<QueueError>,
        empty_poll_delay: Duration,
    }

    impl MockQueuePort {
        pub fn new(queue_url: impl Into<String>) -> Self {
            Self {
                queue_url: Ok(queue_url.into()),
                script: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                shutdown_on_drain: Mutex::new(None),
                delete_error: None,
                visibility_error: None,
                empty_poll_delay: Duration::from_millis(1),
            }
        }

        pub fn new_unresolvable(error: QueueError) -> Self {
            let mut mock = Self::new("");
            mock.queue_url = Err(error);
            mock
        }

        /// Append a batch to the receive script
        pub fn push_batch(self, batch: Vec<Message>) -> Self {
            self.script.lock().unwrap().push_back(Ok(batch));
            self
        }

        /// Append a receive failure to the receive script
        pub fn push_receive_error(self, error: QueueError) -> Self {
            self.script.lock().unwrap().push_back(Err(error));
            self
        }

        pub fn shutdown_when_drained(self, sender: ShutdownSender) -> Self {
            *self.shutdown_on_drain.lock().unwrap() = Some(sender);
            self
        }

        pub fn failing_deletes(mut self, error: QueueError) -> Self {
            self.delete_error = Some(error);
            self
        }

        pub fn failing_visibility_changes(mut self, error: QueueError) -> Self {
            self.visibility_error = Some(error);
            self
        }

        pub fn calls(&self) -> Vec<QueueCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn receive_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, QueueCall::Receive { .. }))
                .count()
        }

        pub fn deleted(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    QueueCall::Delete(receipt) => Some(receipt),
                    _ => None,
                })
                .collect()
        }

        pub fn visibility_changes(&self) -> Vec<(String, u64)> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    QueueCall::ChangeVisibility {
                        receipt_handle,
                        visibility_timeout_seconds,
                    } => Some((receipt_handle, visibility_timeout_seconds)),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: QueueCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl QueuePort for MockQueuePort {
        async fn resolve_queue_url(&self, queue_name: &str) -> Result<QueueUrl, QueueError> {
            self.record(QueueCall::Resolve(queue_name.to_string()));
            self.queue_url.clone()
        }

        async fn receive_messages(
            &self,
            _queue_url: &str,
            max_messages: u32,
            wait_time_seconds: u32,
        ) -> Result<Vec<Message>, QueueError> {
            self.record(QueueCall::Receive {
                max_messages,
                wait_time_seconds,
            });

            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => {
                    {
                        let guard = self.shutdown_on_drain.lock().unwrap();
                        if let Some(sender) = guard.as_ref() {
                            sender.shutdown();
                        }
                    }
                    tokio::time::sleep(self.empty_poll_delay).await;
                    Ok(Vec::new())
                }
            }
        }

        async fn delete_message(
            &self,
            _queue_url: &str,
            receipt_handle: &str,
        ) -> Result<(), QueueError> {
            self.record(QueueCall::Delete(receipt_handle.to_string()));
            match &self.delete_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        async fn change_message_visibility(
            &self,
            _queue_url: &str,
            receipt_handle: &str,
            visibility_timeout_seconds: u64,
        ) -> Result<(), QueueError> {
            self.record(QueueCall::ChangeVisibility {
                receipt_handle: receipt_handle.to_string(),
                visibility_timeout_seconds,
            });
            match &self.visibility_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }
}
