// Port Layer - Interfaces for external collaborators

pub mod message_handler;
pub mod queue_port;

// Re-exports
pub use message_handler::{handler_fn, HandlerError, HandlerFn, MessageHandler, Outcome};
pub use queue_port::{QueueError, QueuePort};
