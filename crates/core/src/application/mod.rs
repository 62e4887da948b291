// Application Layer - Poll loop, dispatch and redelivery policy

pub mod backoff;
pub mod worker;

// Re-exports
pub use backoff::{retry_in, BackoffPolicy};
pub use worker::{
    shutdown_channel, BatchReport, Disposition, Dispatcher, ShutdownSender, ShutdownToken, Worker,
};
