//! Command-line / environment configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use sqsworker_core::domain::WorkerConfig;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "sqsworker")]
#[command(about = "Poll SQS queues and dispatch messages to handlers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Queue to consume, as NAME[:MAX_MESSAGES[:WAIT_SECONDS]] (repeatable)
    #[arg(
        short,
        long = "queue",
        env = "SQSWORKER_QUEUES",
        value_delimiter = ',',
        required = true
    )]
    pub queues: Vec<QueueArg>,

    /// Override the SQS endpoint (e.g. http://localhost:4566 for LocalStack)
    #[arg(long, env = "SQSWORKER_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Make the demo handler fail until a message reaches this receive count
    #[arg(long, env = "SQSWORKER_SUCCEED_ON_ATTEMPT")]
    pub succeed_on_attempt: Option<u32>,

    /// Log output format
    #[arg(long, env = "SQSWORKER_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// One `--queue` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueArg {
    pub name: String,
    pub max_messages: Option<u32>,
    pub wait_time_seconds: Option<u32>,
}

impl FromStr for QueueArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split(':');
        let name = parts.next().unwrap_or_default().trim().to_string();
        if name.is_empty() {
            bail!("queue name cannot be empty in {:?}", s);
        }

        let max_messages = parts
            .next()
            .map(|v| v.trim().parse::<u32>())
            .transpose()
            .with_context(|| format!("invalid max messages in {:?}", s))?;
        let wait_time_seconds = parts
            .next()
            .map(|v| v.trim().parse::<u32>())
            .transpose()
            .with_context(|| format!("invalid wait seconds in {:?}", s))?;

        if parts.next().is_some() {
            bail!("too many fields in {:?}, expected NAME[:MAX[:WAIT]]", s);
        }

        Ok(Self {
            name,
            max_messages,
            wait_time_seconds,
        })
    }
}

impl QueueArg {
    pub fn to_worker_config(&self) -> WorkerConfig {
        let mut config = WorkerConfig::new(self.name.clone());
        if let Some(max) = self.max_messages {
            config = config.with_max_messages(max);
        }
        if let Some(wait) = self.wait_time_seconds {
            config = config.with_wait_time_seconds(wait);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_arg_name_only() {
        let arg: QueueArg = "test_queue_1".parse().unwrap();
        assert_eq!(arg.name, "test_queue_1");
        assert_eq!(arg.to_worker_config(), WorkerConfig::new("test_queue_1"));
    }

    #[test]
    fn test_queue_arg_full() {
        let arg: QueueArg = "test_queue_2:3:5".parse().unwrap();
        let config = arg.to_worker_config();
        assert_eq!(config.max_messages, 3);
        assert_eq!(config.wait_time_seconds, 5);
    }

    #[test]
    fn test_queue_arg_errors() {
        assert!("".parse::<QueueArg>().is_err());
        assert!("q:abc".parse::<QueueArg>().is_err());
        assert!("q:1:2:3".parse::<QueueArg>().is_err());
    }

    #[test]
    fn test_cli_parses_repeated_and_delimited_queues() {
        let cli = Cli::try_parse_from([
            "sqsworker",
            "--queue",
            "a:3:15,b",
            "-q",
            "c:1",
            "--log-format",
            "json",
        ])
        .unwrap();
        let names: Vec<_> = cli.queues.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
