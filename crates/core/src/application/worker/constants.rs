// Worker constants (no magic values)
use std::time::Duration;

/// Pause after a receive failure the transport's long-poll cannot throttle
/// (throttling, missing queue, or a zero wait time)
pub const FETCH_ERROR_PAUSE: Duration = Duration::from_secs(1);
