//! Request and response types exchanged with the unlock service.
//!
//! These types are serialised as JSON over the service's HTTP API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contact::{ContactLink, ContactPayload};

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Lock state of a viewer session as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No unlock attempted yet.
    Locked,
    /// The most recent attempt failed. Further attempts are allowed.
    LockedWithError,
    /// The envelope was opened; the contact is cached for the session.
    Unlocked,
}

/// Response body for `POST /sessions`, `GET /sessions/{id}` and a successful
/// `POST /sessions/{id}/unlock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionStatus,
    /// Present only once the session is unlocked.
    pub contact: Option<ContactPayload>,
    /// Clickable links for `contact`; empty while locked.
    #[serde(default)]
    pub links: Vec<ContactLink>,
}

// ---------------------------------------------------------------------------
// Unlock endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /sessions/{id}/unlock`.
#[derive(Clone, Serialize, Deserialize)]
pub struct UnlockRequest {
    /// The envelope string embedded in the page.
    pub envelope: String,
    /// Password supplied by the viewer.
    pub password: String,
}

impl std::fmt::Debug for UnlockRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockRequest")
            .field("envelope_len", &self.envelope.len())
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"incorrect_password"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Number of sessions currently held in memory.
    pub sessions_active: usize,
}
