// SQS implementation of QueuePort
use crate::error::map_sdk_error;
use async_trait::async_trait;
use aws_sdk_sqs::types::MessageSystemAttributeName;
use aws_sdk_sqs::Client;
use sqsworker_core::domain::{Message, QueueUrl};
use sqsworker_core::port::{QueueError, QueuePort};
use tracing::{debug, warn};

/// Queue port backed by an AWS SQS client
///
/// `Client` is cheap to clone and safe to share, so one port can serve every
/// worker in the process.
#[derive(Clone, Debug)]
pub struct SqsQueuePort {
    client: Client,
}

impl SqsQueuePort {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Convert an SDK message, dropping deliveries that cannot be acknowledged
fn into_domain_message(message: aws_sdk_sqs::types::Message) -> Option<Message> {
    let message_id = message.message_id.unwrap_or_default();
    let receipt_handle = match message.receipt_handle {
        Some(handle) => handle,
        None => {
            warn!(message_id = %message_id, "Received message without receipt handle, skipping");
            return None;
        }
    };

    let attributes = message
        .attributes
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name.as_str().to_string(), value))
        .collect();

    Some(Message {
        message_id,
        receipt_handle,
        body: message.body,
        attributes,
    })
}

fn to_sdk_i32(name: &str, value: u64) -> Result<i32, QueueError> {
    i32::try_from(value).map_err(|_| {
        QueueError::Unknown(format!("{} {} does not fit in an SQS request", name, value))
    })
}

#[async_trait]
impl QueuePort for SqsQueuePort {
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<QueueUrl, QueueError> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        output.queue_url.ok_or_else(|| {
            QueueError::NotFound(format!("No URL returned for queue {}", queue_name))
        })
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<Message>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(to_sdk_i32("max_messages", max_messages.into())?)
            .wait_time_seconds(to_sdk_i32("wait_time_seconds", wait_time_seconds.into())?)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(map_sdk_error)?;

        let messages: Vec<Message> = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(into_domain_message)
            .collect();

        debug!(queue_url = %queue_url, count = messages.len(), "Received batch");
        Ok(messages)
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn change_message_visibility(
        &self,
        queue_url: &str,
        receipt_handle: &str,
        visibility_timeout_seconds: u64,
    ) -> Result<(), QueueError> {
        self.client
            .change_message_visibility()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .visibility_timeout(to_sdk_i32("visibility_timeout", visibility_timeout_seconds)?)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }
}
