// Domain Layer - Messages, worker configuration and their invariants

pub mod error;
pub mod message;
pub mod queue;

// Re-exports
pub use error::DomainError;
pub use message::{Message, APPROXIMATE_RECEIVE_COUNT};
pub use queue::{QueueUrl, WorkerConfig};
