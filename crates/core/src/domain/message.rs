// Message Domain Model

use super::error::{DomainError, Result};
use std::collections::HashMap;

/// System attribute carrying the redelivery counter
pub const APPROXIMATE_RECEIVE_COUNT: &str = "ApproximateReceiveCount";

/// A single delivered copy of a queue message
///
/// `receipt_handle` identifies this delivery, not the message: it changes on
/// every redelivery and is the only handle accepted by delete and
/// change-visibility calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: Option<String>,
    /// System attributes as reported by the queue, keyed by attribute name
    pub attributes: HashMap<String, String>,
}

impl Message {
    pub fn new(message_id: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            receipt_handle: receipt_handle.into(),
            body: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Shorthand for setting the redelivery counter
    pub fn with_receive_count(self, count: u32) -> Self {
        self.with_attribute(APPROXIMATE_RECEIVE_COUNT, count.to_string())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Parse the redelivery counter (1 on first delivery)
    ///
    /// # Errors
    /// - `DomainError::MissingAttribute` if the queue did not report it
    /// - `DomainError::MalformedAttribute` if it is not a non-negative integer
    pub fn receive_count(&self) -> Result<u32> {
        let raw = self
            .attribute(APPROXIMATE_RECEIVE_COUNT)
            .ok_or_else(|| DomainError::MissingAttribute {
                message_id: self.message_id.clone(),
                attribute: APPROXIMATE_RECEIVE_COUNT.to_string(),
            })?;

        raw.trim()
            .parse::<u32>()
            .map_err(|_| DomainError::MalformedAttribute {
                message_id: self.message_id.clone(),
                attribute: APPROXIMATE_RECEIVE_COUNT.to_string(),
                value: raw.to_string(),
            })
    }
}
