//! SQS Worker - Main Entry Point
//! One poll loop per configured queue, joined on Ctrl+C

mod config;
mod handlers;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

use config::Cli;
use handlers::{FlakyHandler, LoggingHandler};
use sqsworker_core::application::worker::{shutdown_channel, Worker};
use sqsworker_core::port::{MessageHandler, QueuePort};
use sqsworker_infra_sqs::{build_sqs_client, SqsClientConfig, SqsQueuePort};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse configuration
    let cli = Cli::parse();

    // 2. Initialize logging
    let _log_guard = logging::init_logging(cli.log_format)?;
    info!("SQS worker v{} starting...", VERSION);

    // 3. Setup dependencies (DI wiring)
    let client = build_sqs_client(&SqsClientConfig {
        region: cli.region.clone(),
        endpoint_url: cli.endpoint_url.clone(),
    })
    .await;
    let queue_port: Arc<dyn QueuePort> = Arc::new(SqsQueuePort::new(client));

    let handler: Arc<dyn MessageHandler> = match cli.succeed_on_attempt {
        Some(attempt) => Arc::new(FlakyHandler::new(attempt)),
        None => Arc::new(LoggingHandler),
    };

    // 4. Build every worker before starting any; resolution failure is fatal
    let mut workers = Vec::with_capacity(cli.queues.len());
    for queue_arg in &cli.queues {
        let worker = Worker::new(Arc::clone(&queue_port), queue_arg.to_worker_config())
            .await
            .with_context(|| format!("Failed to create worker for queue {}", queue_arg.name))?;
        workers.push(worker);
    }

    // 5. Start workers
    let (shutdown_tx, _) = shutdown_channel();
    let mut running = JoinSet::new();
    for worker in workers {
        let token = shutdown_tx.subscribe();
        let handler = Arc::clone(&handler);
        running.spawn(async move {
            worker.start(token, handler).await;
            worker.queue_name().to_string()
        });
    }

    info!(workers = running.len(), "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Shutdown signal received, draining in-flight batches...");

    // 7. Graceful shutdown: every worker finishes its current batch
    shutdown_tx.shutdown();
    while let Some(joined) = running.join_next().await {
        match joined {
            Ok(queue) => info!(queue = %queue, "Worker stopped"),
            Err(e) => error!(error = ?e, "Worker task failed"),
        }
    }

    info!("All done, shutting down");
    Ok(())
}
