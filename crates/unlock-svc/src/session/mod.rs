//! Viewer sessions: the unlock state machine and the cached contact.
//!
//! # Lifecycle
//!
//! 1. `POST /sessions` creates a session in [`SessionState::Locked`].
//! 2. Each unlock attempt decrypts outside any lock, then calls
//!    [`UnlockSession::record`] with the outcome.
//! 3. A success moves the session to [`SessionState::Unlocked`] and caches the
//!    contact. That state is terminal; there is no re-lock.
//! 4. A failure moves it to [`SessionState::LockedWithError`]; the viewer may retry.
//!    Only one attempt per session runs at a time; a second one is refused, not queued.
//! 5. [`sweep_task`] drops sessions older than the configured TTL. The store
//!    refuses new sessions once it holds its configured maximum.
//!
//! # Security invariants
//!
//! - The session never holds the password, the derived key, or the envelope.
//! - The cached contact lives only in process memory.

pub mod store;

pub use store::{sweep_task, Attempt, AttemptGuard, SessionError, SessionStore};

use std::{sync::Arc, time::Duration};

use common::protocol::{SessionStatus, SessionView};
use common::ContactPayload;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

/// Lock state of a single viewer session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Locked,
    LockedWithError,
    Unlocked(ContactPayload),
}

/// Explicit per-viewer context passed to the unlock flow.
#[derive(Debug, Clone)]
pub struct UnlockSession {
    state: SessionState,
    created_at: Instant,
    attempt: Arc<Mutex<()>>,
}

impl UnlockSession {
    /// Create a locked session starting now.
    pub fn new() -> Self {
        Self {
            state: SessionState::Locked,
            created_at: Instant::now(),
            attempt: Arc::new(Mutex::new(())),
        }
    }

    /// Claim this session's single attempt slot, or `None` if another attempt
    /// holds it. The slot is released when the guard drops.
    pub fn try_begin_attempt(&self) -> Option<AttemptGuard> {
        Arc::clone(&self.attempt).try_lock_owned().ok()
    }

    /// The contact cached by a successful unlock, if any.
    pub fn cached_contact(&self) -> Option<&ContactPayload> {
        match &self.state {
            SessionState::Unlocked(contact) => Some(contact),
            _ => None,
        }
    }

    /// Apply the outcome of one decrypt attempt.
    ///
    /// The cache is written at most once: after the first success every later
    /// outcome is ignored. Returns `true` if the session is unlocked afterwards.
    pub fn record(&mut self, outcome: Option<ContactPayload>) -> bool {
        if matches!(self.state, SessionState::Unlocked(_)) {
            return true;
        }
        self.state = match outcome {
            Some(contact) => SessionState::Unlocked(contact),
            None => SessionState::LockedWithError,
        };
        matches!(self.state, SessionState::Unlocked(_))
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }

    /// Client-facing snapshot of this session.
    pub fn view(&self, session_id: Uuid) -> SessionView {
        let state = match self.state {
            SessionState::Locked => SessionStatus::Locked,
            SessionState::LockedWithError => SessionStatus::LockedWithError,
            SessionState::Unlocked(_) => SessionStatus::Unlocked,
        };
        let contact = self.cached_contact().cloned();
        let links = contact.as_ref().map(ContactPayload::links).unwrap_or_default();
        SessionView {
            session_id,
            state,
            contact,
            links,
        }
    }
}

impl Default for UnlockSession {
    fn default() -> Self {
        Self::new()
    }
}
