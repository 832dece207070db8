//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::session::SessionStore;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable so that Axum can clone the state for each
/// request without copying session data.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Live viewer sessions and their cached contacts.
    pub sessions: SessionStore,
    /// Longest envelope string the unlock endpoint will try to open.
    pub max_envelope_len: usize,
    /// One permit per key derivation allowed to run at once. Requests that
    /// find none free are refused rather than queued.
    pub decrypt_permits: Arc<Semaphore>,
}

impl AppState {
    /// Create a new [`AppState`] from the store and request limits.
    pub fn new(sessions: SessionStore, max_envelope_len: usize, max_concurrent_decrypts: usize) -> Self {
        Self {
            sessions,
            max_envelope_len,
            decrypt_permits: Arc::new(Semaphore::new(max_concurrent_decrypts)),
        }
    }

    /// Build state from validated configuration.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            SessionStore::new(cfg.session_ttl(), cfg.max_sessions),
            cfg.max_envelope_len,
            cfg.max_concurrent_decrypts,
        )
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with an empty store, suitable for tests.
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
