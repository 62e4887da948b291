// SQS client construction
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::Client;
use tracing::info;

/// Connection settings for the SQS client
///
/// Credentials always come from the default AWS provider chain.
#[derive(Debug, Clone, Default)]
pub struct SqsClientConfig {
    /// Override region (falls back to the provider chain)
    pub region: Option<String>,
    /// Override endpoint, e.g. `http://localhost:4566` for LocalStack
    pub endpoint_url: Option<String>,
}

/// Build an SQS client from the default provider chain plus overrides
pub async fn build_sqs_client(config: &SqsClientConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    let sdk_config = loader.load().await;

    info!(
        region = ?sdk_config.region().map(|r| r.as_ref().to_string()),
        endpoint = ?config.endpoint_url,
        "SQS client configured"
    );

    Client::new(&sdk_config)
}
