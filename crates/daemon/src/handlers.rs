//! Demo handlers wired by the binary
//!
//! Real deployments embed `sqsworker-core` and supply their own
//! `MessageHandler`; these exist to exercise a queue end to end.

use async_trait::async_trait;
use sqsworker_core::domain::Message;
use sqsworker_core::port::{HandlerError, MessageHandler};
use tracing::info;

/// Logs every message and acknowledges it
pub struct LoggingHandler;

#[async_trait]
impl MessageHandler for LoggingHandler {
    async fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        info!(
            message_id = %message.message_id,
            body = message.body.as_deref().unwrap_or_default(),
            "Done processing message"
        );
        Ok(())
    }
}

/// Fails every delivery until the redelivery counter reaches `succeed_on`
///
/// Useful for watching the backoff schedule against a real queue.
pub struct FlakyHandler {
    succeed_on: u32,
}

impl FlakyHandler {
    pub fn new(succeed_on: u32) -> Self {
        Self { succeed_on }
    }
}

#[async_trait]
impl MessageHandler for FlakyHandler {
    async fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        let attempt = message.receive_count()?;
        info!(
            message_id = %message.message_id,
            body = message.body.as_deref().unwrap_or_default(),
            attempt = attempt,
            "Processing message"
        );

        if attempt >= self.succeed_on {
            info!(message_id = %message.message_id, "Done processing message");
            return Ok(());
        }

        Err(HandlerError::failed(format!(
            "attempt {} of {} is going to fail",
            attempt, self.succeed_on
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_handler_always_succeeds() {
        let msg = Message::new("m-1", "r-1").with_body("hi");
        assert_eq!(LoggingHandler.handle(&msg).await, Ok(()));
    }

    #[tokio::test]
    async fn test_flaky_handler_succeeds_on_configured_attempt() {
        let handler = FlakyHandler::new(4);
        for attempt in 1..4 {
            let msg = Message::new("m-1", "r-1").with_receive_count(attempt);
            assert!(handler.handle(&msg).await.is_err(), "attempt {}", attempt);
        }
        let msg = Message::new("m-1", "r-1").with_receive_count(4);
        assert_eq!(handler.handle(&msg).await, Ok(()));
    }

    #[tokio::test]
    async fn test_flaky_handler_fails_without_counter() {
        let handler = FlakyHandler::new(1);
        let msg = Message::new("m-1", "r-1");
        assert!(matches!(
            handler.handle(&msg).await,
            Err(HandlerError::Failed(_))
        ));
    }
}
