// Panic isolation for dispatch tasks
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed (successfully or not)
    Completed(T),
    /// Execution panicked
    Panicked(String),
}

/// Poll a future to completion, catching any panic raised while polling it
///
/// A panicking handler must not take down its sibling tasks, so the panic is
/// turned into a value.
pub async fn execute_guarded<F, T>(future: F) -> PanicGuardResult<T>
where
    F: Future<Output = T>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(value) => PanicGuardResult::Completed(value),
        Err(payload) => {
            let panic_msg = panic_message(payload.as_ref());
            error!(panic_msg = %panic_msg, "Dispatch task panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

/// Best-effort extraction of a panic payload's message
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
