//! Small utilities shared across the crate.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time as nanoseconds since the Unix epoch.
///
/// Used to stamp orders and trades at admission/execution time.
pub fn current_time_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos() as u64)
        .unwrap_or(0)
}
