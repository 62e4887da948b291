// Redelivery backoff (borrowed from DelayedJob: 5 + attempt^4 seconds)
use tracing::warn;

/// Constant term of the backoff curve, in seconds
pub const BACKOFF_BASE_SECS: u64 = 5;

/// Largest visibility timeout SQS accepts (12 hours)
pub const MAX_VISIBILITY_TIMEOUT_SECS: u64 = 12 * 60 * 60;

/// Seconds until the next delivery of a message on its `attempt`-th receive
///
/// `retry_in(1) == 6`, `retry_in(4) == 261`, `retry_in(10) == 10_005`.
/// Saturates instead of overflowing.
pub fn retry_in(attempt: u32) -> u64 {
    BACKOFF_BASE_SECS.saturating_add(u64::from(attempt).saturating_pow(4))
}

/// Maps a redelivery counter to the new visibility timeout of a failed message
///
/// The value replaces the remaining timeout; it is not added to it. By default
/// the result is clamped to [`MAX_VISIBILITY_TIMEOUT_SECS`] so that large
/// counters (attempt >= 15) still produce a timeout the queue accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_visibility_timeout_secs: Option<u64>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(MAX_VISIBILITY_TIMEOUT_SECS)
    }
}

impl BackoffPolicy {
    /// Policy clamped to `max_visibility_timeout_secs`
    pub fn new(max_visibility_timeout_secs: u64) -> Self {
        Self {
            max_visibility_timeout_secs: Some(max_visibility_timeout_secs),
        }
    }

    /// Policy without a ceiling; the queue rejects oversized values and the
    /// message falls back to its natural timeout
    pub fn unbounded() -> Self {
        Self {
            max_visibility_timeout_secs: None,
        }
    }

    pub fn max_visibility_timeout_secs(&self) -> Option<u64> {
        self.max_visibility_timeout_secs
    }

    /// Visibility timeout (seconds) for a message on its `attempt`-th receive
    pub fn visibility_timeout(&self, attempt: u32) -> u64 {
        let delay = retry_in(attempt);
        match self.max_visibility_timeout_secs {
            Some(max) if delay > max => {
                warn!(
                    attempt = attempt,
                    delay_secs = delay,
                    max_secs = max,
                    "Backoff exceeds visibility timeout ceiling, clamping"
                );
                max
            }
            _ => delay,
        }
    }
}
