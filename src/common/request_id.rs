//! Request ids for log correlation.

use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a request id of the form `<unix-seconds>-<counter>`.
///
/// Safe to call from concurrent requests; the counter wraps at five digits.
pub fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{}-{:05}", chrono::Utc::now().timestamp(), counter % 100_000)
}
