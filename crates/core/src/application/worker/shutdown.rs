// Worker Shutdown Token

use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation signal observed by workers between poll iterations
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for shutdown signal
    ///
    /// Never resolves if every sender is dropped without signalling.
    pub async fn wait(&mut self) {
        if self.is_shutdown() {
            return;
        }
        while self.rx.changed().await.is_ok() {
            if self.is_shutdown() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

/// Caller-held cancellation handle
#[derive(Clone)]
pub struct ShutdownSender {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSender {
    /// Signal shutdown to all workers
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    /// Hand out another token for a new worker
    pub fn subscribe(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx: Arc::new(tx) }, ShutdownToken { rx })
}
