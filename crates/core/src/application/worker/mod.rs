// Worker - Poll loop for one queue

pub mod constants;
mod dispatcher;
mod panic_guard;
mod shutdown;

use constants::*;
pub use dispatcher::{BatchReport, Disposition, Dispatcher};
pub use panic_guard::{execute_guarded, panic_message, PanicGuardResult};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::backoff::BackoffPolicy;
use crate::domain::{QueueUrl, WorkerConfig};
use crate::error::{AppError, Result};
use crate::port::{MessageHandler, QueueError, QueuePort};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, Instrument, Span};

/// Worker polls one queue and dispatches every received batch
///
/// States: Polling -> Dispatching -> Polling, or Polling -> Stopped once
/// shutdown is observed. Shutdown is only checked before a receive call, so a
/// batch that was already received is always fully resolved.
pub struct Worker {
    config: WorkerConfig,
    queue_url: QueueUrl,
    queue_port: Arc<dyn QueuePort>,
    backoff: BackoffPolicy,
    span: Span,
}

impl Worker {
    /// Create a worker, resolving the queue URL once
    ///
    /// # Errors
    /// - `AppError::Domain` if the configuration is out of bounds
    /// - `AppError::Queue` if the queue URL cannot be resolved
    /// - `AppError::Config` if the transport resolves an empty URL
    pub async fn new(queue_port: Arc<dyn QueuePort>, config: WorkerConfig) -> Result<Self> {
        config.validate()?;

        let queue_url = queue_port
            .resolve_queue_url(&config.queue_name)
            .await
            .map_err(|e| {
                error!(queue = %config.queue_name, error = %e, "Failed to resolve queue URL");
                AppError::Queue(e)
            })?;

        if queue_url.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Queue {} resolved to an empty URL",
                config.queue_name
            )));
        }

        info!(queue = %config.queue_name, queue_url = %queue_url, "Resolved queue URL");

        let span = info_span!("worker", queue = %config.queue_name);
        Ok(Self {
            config,
            queue_url,
            queue_port,
            backoff: BackoffPolicy::default(),
            span,
        })
    }

    /// Replace the redelivery backoff policy
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replace the span every loop and dispatch event is recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn queue_name(&self) -> &str {
        &self.config.queue_name
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run the poll loop until shutdown is observed
    ///
    /// Returns once the worker is Stopped, which includes draining the batch
    /// in flight when shutdown was signalled.
    pub async fn start(&self, shutdown: ShutdownToken, handler: Arc<dyn MessageHandler>) {
        self.run(shutdown, handler)
            .instrument(self.span.clone())
            .await
    }

    async fn run(&self, mut shutdown: ShutdownToken, handler: Arc<dyn MessageHandler>) {
        info!("Starting poller");
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.queue_port),
            self.queue_url.as_str(),
            self.backoff,
        );

        loop {
            if shutdown.is_shutdown() {
                info!("Stopping poller, shutdown requested");
                break;
            }

            debug!(
                max_messages = self.config.max_messages,
                wait_time_seconds = self.config.wait_time_seconds,
                "Polling"
            );
            let received = self
                .queue_port
                .receive_messages(
                    &self.queue_url,
                    self.config.max_messages,
                    self.config.wait_time_seconds,
                )
                .await;

            match received {
                Ok(batch) if batch.is_empty() => continue,
                Ok(batch) => {
                    dispatcher.dispatch(batch, &handler).await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to receive messages");
                    if self.should_pause_after(&e) {
                        tokio::select! {
                            _ = sleep(FETCH_ERROR_PAUSE) => {},
                            _ = shutdown.wait() => {},
                        }
                    }
                }
            }
        }

        info!("Poller stopped");
    }

    /// Whether a receive failure needs a pause before the next attempt
    ///
    /// Long-poll waits throttle plain transport retries already; throttling,
    /// a vanished queue, or a zero wait time do not.
    fn should_pause_after(&self, error: &QueueError) -> bool {
        error.is_throttled() || error.is_not_found() || self.config.wait_time_seconds == 0
    }
}
