// SDK error classification
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use sqsworker_core::port::QueueError;

/// Error codes SQS uses for a queue that does not exist
const NOT_FOUND_CODES: &[&str] = &[
    "AWS.SimpleQueueService.NonExistentQueue",
    "QueueDoesNotExist",
    "ReceiptHandleIsInvalid",
];

/// Error codes SQS uses when rate limiting a caller
const THROTTLED_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "RequestThrottled",
    "OverLimit",
    "AWS.SimpleQueueService.RequestThrottled",
];

/// Map an SDK error onto the closed `QueueError` kind set
pub fn map_sdk_error<E, R>(err: SdkError<E, R>) -> QueueError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            QueueError::Transport(message)
        }
        SdkError::ServiceError(service) => classify_code(service.err().code(), message),
        _ => QueueError::Unknown(message),
    }
}

/// Classify a service error code
pub(crate) fn classify_code(code: Option<&str>, message: String) -> QueueError {
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code) => QueueError::NotFound(message),
        Some(code) if THROTTLED_CODES.contains(&code) => QueueError::Throttled(message),
        _ => QueueError::Unknown(message),
    }
}
