// Dispatcher - per-batch fan-out
//
// One task per message, full join before returning. Each task runs
// handler -> (delete | change visibility) and never reports errors upward.

use super::panic_guard::{execute_guarded, panic_message, PanicGuardResult};
use crate::application::backoff::BackoffPolicy;
use crate::domain::Message;
use crate::port::{HandlerError, MessageHandler, Outcome, QueuePort};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// How a single message left its dispatch task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Handler succeeded and the message was deleted
    Deleted,
    /// Handler failed and the visibility timeout was replaced
    Extended { visibility_timeout_seconds: u64 },
    /// Handler succeeded but the delete call failed
    DeleteFailed,
    /// Handler failed and the change-visibility call failed too
    ExtendFailed,
    /// Task ended without touching the queue (malformed counter or task panic)
    Dropped,
}

/// Per-batch tally of dispositions
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub deleted: usize,
    pub extended: usize,
    pub delete_failed: usize,
    pub extend_failed: usize,
    pub dropped: usize,
}

impl BatchReport {
    pub fn record(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::Deleted => self.deleted += 1,
            Disposition::Extended { .. } => self.extended += 1,
            Disposition::DeleteFailed => self.delete_failed += 1,
            Disposition::ExtendFailed => self.extend_failed += 1,
            Disposition::Dropped => self.dropped += 1,
        }
    }

    /// Number of messages resolved, whatever the disposition
    pub fn total(&self) -> usize {
        self.deleted + self.extended + self.delete_failed + self.extend_failed + self.dropped
    }
}

/// Runs a handler over every message of a batch concurrently
pub struct Dispatcher {
    queue_port: Arc<dyn QueuePort>,
    queue_url: Arc<str>,
    backoff: BackoffPolicy,
}

impl Dispatcher {
    pub fn new(
        queue_port: Arc<dyn QueuePort>,
        queue_url: impl Into<Arc<str>>,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            queue_port,
            queue_url: queue_url.into(),
            backoff,
        }
    }

    /// Dispatch a batch and wait until every message is resolved
    ///
    /// Concurrency equals the batch size. A panicking task is logged and
    /// counted as dropped; its siblings are unaffected.
    pub async fn dispatch(
        &self,
        batch: Vec<Message>,
        handler: &Arc<dyn MessageHandler>,
    ) -> BatchReport {
        info!(count = batch.len(), "Received messages");

        let mut tasks = JoinSet::new();
        for message in batch {
            let span = info_span!("message", message_id = %message.message_id);
            let task = MessageTask {
                queue_port: Arc::clone(&self.queue_port),
                queue_url: Arc::clone(&self.queue_url),
                backoff: self.backoff,
                handler: Arc::clone(handler),
            };
            tasks.spawn(task.run(message).instrument(span));
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(disposition) => report.record(disposition),
                Err(join_err) => {
                    if join_err.is_panic() {
                        let panic_msg = panic_message(join_err.into_panic().as_ref());
                        error!(panic_msg = %panic_msg, "Dispatch task panicked");
                    } else {
                        error!(error = %join_err, "Dispatch task cancelled");
                    }
                    report.record(Disposition::Dropped);
                }
            }
        }

        info!(
            deleted = report.deleted,
            extended = report.extended,
            delete_failed = report.delete_failed,
            extend_failed = report.extend_failed,
            dropped = report.dropped,
            "Batch resolved"
        );
        report
    }
}

/// Everything one dispatch task needs, owned so the task can be spawned
struct MessageTask {
    queue_port: Arc<dyn QueuePort>,
    queue_url: Arc<str>,
    backoff: BackoffPolicy,
    handler: Arc<dyn MessageHandler>,
}

impl MessageTask {
    async fn run(self, message: Message) -> Disposition {
        let outcome = match execute_guarded(async { self.handler.handle(&message).await }).await {
            PanicGuardResult::Completed(result) => Outcome::from(result),
            PanicGuardResult::Panicked(msg) => Outcome::Failure(HandlerError::Panicked(msg)),
        };

        // Without a usable counter neither outcome is acted on; the queue's own
        // visibility timeout redelivers the message.
        let receive_count = match message.receive_count() {
            Ok(count) => count,
            Err(e) => {
                error!(
                    error = %e,
                    "Cannot read redelivery counter, leaving message to queue timeout"
                );
                return Disposition::Dropped;
            }
        };

        match outcome {
            Outcome::Success => self.delete(&message).await,
            Outcome::Failure(e) => {
                warn!(error = %e, receive_count = receive_count, "Error handling message");
                self.defer(&message, receive_count).await
            }
        }
    }

    async fn delete(&self, message: &Message) -> Disposition {
        match self
            .queue_port
            .delete_message(&self.queue_url, &message.receipt_handle)
            .await
        {
            Ok(()) => {
                debug!(receipt_handle = %message.receipt_handle, "Deleted message");
                Disposition::Deleted
            }
            Err(e) => {
                error!(error = %e, "Failed to delete message, it will be redelivered");
                Disposition::DeleteFailed
            }
        }
    }

    async fn defer(&self, message: &Message, receive_count: u32) -> Disposition {
        let visibility_timeout_seconds = self.backoff.visibility_timeout(receive_count);
        info!(
            receive_count = receive_count,
            visibility_timeout = visibility_timeout_seconds,
            "Deferring redelivery"
        );

        match self
            .queue_port
            .change_message_visibility(
                &self.queue_url,
                &message.receipt_handle,
                visibility_timeout_seconds,
            )
            .await
        {
            Ok(()) => Disposition::Extended {
                visibility_timeout_seconds,
            },
            Err(e) => {
                error!(
                    error = %e,
                    visibility_timeout = visibility_timeout_seconds,
                    "Failed to change message visibility, falling back to queue timeout"
                );
                Disposition::ExtendFailed
            }
        }
    }
}
