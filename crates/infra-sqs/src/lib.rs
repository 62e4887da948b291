// SQS Worker Infrastructure - AWS SQS Adapter
// Implements: QueuePort

mod client;
mod error;
mod queue_port;

pub use client::{build_sqs_client, SqsClientConfig};
pub use error::map_sdk_error;
pub use queue_port::SqsQueuePort;
