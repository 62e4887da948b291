//! Poll loop behaviour: batches are drained before the next receive, receive
//! failures never stop the loop

mod common;

use async_trait::async_trait;
use common::*;
use sqsworker_core::application::worker::{shutdown_channel, Worker};
use sqsworker_core::domain::{Message, WorkerConfig};
use sqsworker_core::port::queue_port::mocks::{MockQueuePort, QueueCall};
use sqsworker_core::port::{HandlerError, MessageHandler, QueueError, QueuePort};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Split the call log into per-receive segments and count acknowledgements
fn acks_per_receive(calls: &[QueueCall]) -> Vec<usize> {
    let mut segments = Vec::new();
    for call in calls {
        match call {
            QueueCall::Receive { .. } => segments.push(0),
            QueueCall::Delete(_) | QueueCall::ChangeVisibility { .. } => {
                *segments.last_mut().expect("ack before any receive") += 1
            }
            QueueCall::Resolve(_) => {}
        }
    }
    segments
}

#[tokio::test]
async fn test_batch_is_fully_resolved_before_next_receive() {
    let (tx, token) = shutdown_channel();
    let port = Arc::new(
        MockQueuePort::new(QUEUE_URL)
            .push_batch(vec![message("m1", 1), message("m2", 2), message("m3", 1)])
            .push_batch(vec![message("m4", 1), message("m5", 3)])
            .shutdown_when_drained(tx),
    );
    let handler = Arc::new(
        ScriptedHandler::succeeding()
            .failing_on(&["m2", "m5"])
            .with_delay(Duration::from_millis(3)),
    );

    worker(&port, WorkerConfig::new(QUEUE_NAME).with_max_messages(3))
        .await
        .start(token, handler)
        .await;

    // Two batches, then the empty receive that triggered shutdown
    assert_eq!(acks_per_receive(&port.calls()), vec![3, 2, 0]);
    assert_eq!(port.deleted().len(), 3);
    assert_eq!(port.visibility_changes().len(), 2);
}

/// Sleeps a fixed time per message and records the peak number in flight
struct SlowHandler {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowHandler {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MessageHandler for SlowHandler {
    async fn handle(&self, _message: &Message) -> Result<(), HandlerError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_batch_messages_are_handled_concurrently() {
    let (tx, token) = shutdown_channel();
    let batch = (1..=5).map(|i| message(&format!("m{}", i), 1)).collect();
    let port = Arc::new(
        MockQueuePort::new(QUEUE_URL)
            .push_batch(batch)
            .shutdown_when_drained(tx),
    );
    let handler = Arc::new(SlowHandler::new(Duration::from_millis(200)));

    let started = Instant::now();
    worker(&port, WorkerConfig::new(QUEUE_NAME).with_max_messages(5))
        .await
        .start(token, handler.clone())
        .await;

    // Sequential handling would take at least a full second
    assert!(started.elapsed() < Duration::from_millis(800));
    assert_eq!(handler.peak.load(Ordering::SeqCst), 5);
    assert_eq!(port.deleted().len(), 5);
}

#[tokio::test]
async fn test_receive_failure_is_followed_by_fresh_receive() {
    let (tx, token) = shutdown_channel();
    let port = Arc::new(
        MockQueuePort::new(QUEUE_URL)
            .push_receive_error(QueueError::Transport("connection refused".into()))
            .push_receive_error(QueueError::Unknown("InternalError".into()))
            .push_batch(vec![message("m1", 1)])
            .shutdown_when_drained(tx),
    );
    let handler = Arc::new(ScriptedHandler::succeeding());

    worker(&port, WorkerConfig::new(QUEUE_NAME))
        .await
        .start(token, handler)
        .await;

    assert_eq!(port.receive_count(), 4);
    assert_eq!(port.deleted(), vec![receipt("m1")]);
}

#[tokio::test]
async fn test_throttled_receive_pauses_before_retrying() {
    let (tx, token) = shutdown_channel();
    let port = Arc::new(
        MockQueuePort::new(QUEUE_URL)
            .push_receive_error(QueueError::Throttled("RequestThrottled".into()))
            .shutdown_when_drained(tx),
    );
    let handler = Arc::new(ScriptedHandler::succeeding());

    let started = Instant::now();
    worker(&port, WorkerConfig::new(QUEUE_NAME))
        .await
        .start(token, handler)
        .await;

    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_eq!(port.receive_count(), 2);
}

#[tokio::test]
async fn test_empty_batches_keep_polling() {
    let (tx, token) = shutdown_channel();
    let port = Arc::new(
        MockQueuePort::new(QUEUE_URL)
            .push_batch(Vec::new())
            .push_batch(Vec::new())
            .push_batch(vec![message("m1", 1)])
            .shutdown_when_drained(tx),
    );
    let handler = Arc::new(ScriptedHandler::succeeding());

    worker(&port, WorkerConfig::new(QUEUE_NAME))
        .await
        .start(token, handler.clone())
        .await;

    assert_eq!(port.receive_count(), 4);
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn test_workers_share_one_port_independently() {
    let (tx, _) = shutdown_channel();
    let port = Arc::new(
        MockQueuePort::new(QUEUE_URL)
            .push_batch(vec![message("m1", 1), message("m2", 1)])
            .push_batch(vec![message("m3", 1)])
            .push_batch(vec![message("m4", 1), message("m5", 1)])
            .shutdown_when_drained(tx.clone()),
    );
    let queue_port: Arc<dyn QueuePort> = port.clone();

    let first = Worker::new(Arc::clone(&queue_port), WorkerConfig::new("test_queue_1"))
        .await
        .unwrap();
    let second = Worker::new(Arc::clone(&queue_port), WorkerConfig::new("test_queue_2"))
        .await
        .unwrap();
    let first_handler: Arc<dyn MessageHandler> = Arc::new(ScriptedHandler::succeeding());
    let second_handler: Arc<dyn MessageHandler> = Arc::new(ScriptedHandler::succeeding());

    tokio::join!(
        first.start(tx.subscribe(), first_handler),
        second.start(tx.subscribe(), second_handler),
    );

    let mut deleted = port.deleted();
    deleted.sort();
    assert_eq!(
        deleted,
        vec![receipt("m1"), receipt("m2"), receipt("m3"), receipt("m4"), receipt("m5")]
    );
}
