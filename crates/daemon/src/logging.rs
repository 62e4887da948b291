//! Subscriber setup for the worker process

use crate::config::LogFormat;
use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "sqsworker=info,sqsworker_core=info,sqsworker_infra_sqs=info";

/// Install the global subscriber
///
/// Output goes through a non-blocking stdout writer; keep the returned guard
/// alive until exit so buffered lines are flushed.
pub fn init_logging(format: LogFormat) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| anyhow!("Failed to create env filter: {}", e))?;

    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(writer))
                .try_init()
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(writer))
                .try_init()
        }
    }
    .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;

    Ok(guard)
}
