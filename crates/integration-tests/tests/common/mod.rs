//! Shared fixtures for worker integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use sqsworker_core::application::worker::Worker;
use sqsworker_core::domain::{Message, WorkerConfig};
use sqsworker_core::port::queue_port::mocks::MockQueuePort;
use sqsworker_core::port::{HandlerError, MessageHandler, QueuePort};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const QUEUE_NAME: &str = "test_queue_1";
pub const QUEUE_URL: &str = "http://localhost:4566/000000000000/test_queue_1";

/// Message with a receipt handle derived from its id
pub fn message(id: &str, receive_count: u32) -> Message {
    Message::new(id, receipt(id))
        .with_body(format!("body of {}", id))
        .with_receive_count(receive_count)
}

pub fn receipt(id: &str) -> String {
    format!("receipt-{}", id)
}

pub async fn worker(port: &Arc<MockQueuePort>, config: WorkerConfig) -> Worker {
    let queue_port: Arc<dyn QueuePort> = port.clone();
    Worker::new(queue_port, config)
        .await
        .expect("worker construction")
}

/// Handler that fails for a fixed set of message ids, optionally sleeping
/// per message to shuffle completion order
pub struct ScriptedHandler {
    failing: HashSet<String>,
    panicking: HashSet<String>,
    delay_per_message: Duration,
    calls: AtomicUsize,
}

impl ScriptedHandler {
    pub fn succeeding() -> Self {
        Self {
            failing: HashSet::new(),
            panicking: HashSet::new(),
            delay_per_message: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, ids: &[&str]) -> Self {
        self.failing = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn panicking_on(mut self, ids: &[&str]) -> Self {
        self.panicking = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_per_message = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for ScriptedHandler {
    async fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // Later messages in a batch finish first
        let position = message
            .message_id
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse::<u32>()
            .unwrap_or(0);
        let delay = self.delay_per_message * 10u32.saturating_sub(position);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.panicking.contains(&message.message_id) {
            panic!("handler panicked on {}", message.message_id);
        }
        if self.failing.contains(&message.message_id) {
            return Err(HandlerError::failed(format!("{} failed", message.message_id)));
        }
        Ok(())
    }
}
