//! Axum middleware settings applied to the router.
//!
//! Includes request tracing, timeout enforcement, body limits, and response
//! compression.

use std::time::Duration;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body headroom above the envelope itself: password plus JSON framing.
pub const BODY_OVERHEAD_BYTES: usize = 4096;

/// Largest request body accepted for a given envelope limit.
pub fn body_limit(max_envelope_len: usize) -> usize {
    max_envelope_len.saturating_add(BODY_OVERHEAD_BYTES)
}
