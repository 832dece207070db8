//! [`SessionStore`]: shared map of live viewer sessions.

use std::{collections::HashMap, sync::Arc, time::Duration};

use common::protocol::SessionView;
use common::ContactPayload;
use thiserror::Error;
use tokio::sync::{OwnedMutexGuard, RwLock};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

use super::UnlockSession;

/// Errors produced by the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No live session has this id. Expired sessions report the same.
    #[error("session not found")]
    NotFound,

    /// The store already holds its maximum number of live sessions.
    #[error("session capacity reached")]
    Full,

    /// Another unlock attempt on this session has not finished yet.
    #[error("unlock attempt already in progress")]
    Busy,
}

/// Holds a session's attempt slot; dropping it lets the next attempt in.
pub type AttemptGuard = OwnedMutexGuard<()>;

/// Outcome of [`SessionStore::begin_attempt`].
#[derive(Debug)]
pub enum Attempt {
    /// The session is already unlocked; here is its cached view.
    Unlocked(SessionView),
    /// The caller owns the session's attempt slot until the guard drops.
    Started(AttemptGuard),
}

/// Thread-safe store of viewer sessions keyed by id.
///
/// Wraps an `Arc<RwLock<HashMap<..>>>` so that many handlers can read session
/// views concurrently while unlock outcomes take a short write lock. No lock
/// is held while a decrypt is running.
#[derive(Clone, Debug)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, UnlockSession>>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    /// Create an empty store holding at most `capacity` sessions, each living for `ttl`.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            capacity,
        }
    }

    /// Number of sessions currently held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Open a new locked session.
    ///
    /// When the store is at capacity, expired sessions are purged first so
    /// that a late sweep does not lock out new viewers.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Full`] if the store still holds `capacity`
    /// live sessions.
    pub async fn create(&self) -> Result<SessionView, SessionError> {
        let mut lock = self.inner.write().await;
        if lock.len() >= self.capacity {
            let now = Instant::now();
            lock.retain(|_, s| !s.is_expired(now, self.ttl));
            if lock.len() >= self.capacity {
                warn!(capacity = self.capacity, "session capacity reached");
                return Err(SessionError::Full);
            }
        }
        let id = Uuid::new_v4();
        let session = UnlockSession::new();
        let view = session.view(id);
        lock.insert(id, session);
        debug!(session_id = %id, "session created");
        Ok(view)
    }

    /// Snapshot of a live session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] for unknown or expired ids.
    pub async fn view(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let lock = self.inner.read().await;
        let session = self.live(&lock, id)?;
        Ok(session.view(id))
    }

    /// Claim the attempt slot of a live session before decrypting.
    ///
    /// An unlocked session needs no attempt and yields its cached view.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] for unknown or expired ids, and
    /// [`SessionError::Busy`] while another attempt on the session holds the slot.
    pub async fn begin_attempt(&self, id: Uuid) -> Result<Attempt, SessionError> {
        let lock = self.inner.read().await;
        let session = self.live(&lock, id)?;
        if session.cached_contact().is_some() {
            return Ok(Attempt::Unlocked(session.view(id)));
        }
        session
            .try_begin_attempt()
            .map(Attempt::Started)
            .ok_or(SessionError::Busy)
    }

    /// Apply one decrypt outcome to a live session and return its new view.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if the session vanished or expired
    /// while the decrypt was running.
    pub async fn record(
        &self,
        id: Uuid,
        outcome: Option<ContactPayload>,
    ) -> Result<SessionView, SessionError> {
        let mut lock = self.inner.write().await;
        let now = Instant::now();
        let expired = match lock.get(&id) {
            Some(s) => s.is_expired(now, self.ttl),
            None => return Err(SessionError::NotFound),
        };
        if expired {
            lock.remove(&id);
            return Err(SessionError::NotFound);
        }
        let Some(session) = lock.get_mut(&id) else {
            return Err(SessionError::NotFound);
        };
        let unlocked = session.record(outcome);
        debug!(session_id = %id, unlocked, "unlock attempt recorded");
        Ok(session.view(id))
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut lock = self.inner.write().await;
        let before = lock.len();
        lock.retain(|_, s| !s.is_expired(now, self.ttl));
        before - lock.len()
    }

    fn live<'a>(
        &self,
        sessions: &'a HashMap<Uuid, UnlockSession>,
        id: Uuid,
    ) -> Result<&'a UnlockSession, SessionError> {
        sessions
            .get(&id)
            .filter(|s| !s.is_expired(Instant::now(), self.ttl))
            .ok_or(SessionError::NotFound)
    }
}

/// Spawn a background task that sweeps expired sessions every `every`.
///
/// The first sweep fires after one full interval.
pub fn sweep_task(store: SessionStore, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately; nothing can have expired yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                debug!(purged, "expired sessions swept");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::protocol::SessionStatus;

    const TTL: Duration = Duration::from_secs(60);
    const CAPACITY: usize = 16;

    fn contact() -> ContactPayload {
        ContactPayload {
            email: Some("a@b.com".into()),
            phone: Some("555-1234".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_and_view() {
        let store = SessionStore::new(TTL, CAPACITY);
        let created = store.create().await.unwrap();
        assert_eq!(created.state, SessionStatus::Locked);
        let view = store.view(created.session_id).await.unwrap();
        assert_eq!(view.session_id, created.session_id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_session_not_found() {
        let store = SessionStore::new(TTL, CAPACITY);
        assert!(matches!(
            store.view(Uuid::new_v4()).await,
            Err(SessionError::NotFound)
        ));
        assert!(store.record(Uuid::new_v4(), None).await.is_err());
    }

    #[tokio::test]
    async fn record_caches_contact() {
        let store = SessionStore::new(TTL, CAPACITY);
        let id = store.create().await.unwrap().session_id;

        let failed = store.record(id, None).await.unwrap();
        assert_eq!(failed.state, SessionStatus::LockedWithError);

        let unlocked = store.record(id, Some(contact())).await.unwrap();
        assert_eq!(unlocked.state, SessionStatus::Unlocked);
        assert_eq!(unlocked.links.len(), 2);
        assert_eq!(store.view(id).await.unwrap().contact, Some(contact()));
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new(TTL, CAPACITY);
        let a = store.create().await.unwrap().session_id;
        let b = store.create().await.unwrap().session_id;
        store.record(a, Some(contact())).await.unwrap();
        assert_eq!(
            store.view(b).await.unwrap().state,
            SessionStatus::Locked
        );
    }

    #[tokio::test(start_paused = true)]
    async fn expired_sessions_are_hidden_and_purged() {
        let store = SessionStore::new(TTL, CAPACITY);
        let id = store.create().await.unwrap().session_id;
        time::advance(TTL).await;
        assert!(store.view(id).await.is_err());
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn record_on_expired_session_removes_it() {
        let store = SessionStore::new(TTL, CAPACITY);
        let id = store.create().await.unwrap().session_id;
        time::advance(TTL + Duration::from_secs(1)).await;
        assert!(store.record(id, Some(contact())).await.is_err());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_task_purges_in_background() {
        let store = SessionStore::new(Duration::from_secs(10), CAPACITY);
        store.create().await.unwrap();
        let handle = sweep_task(store.clone(), Duration::from_secs(5));
        // Advance in steps so the spawned task gets to run between ticks.
        for _ in 0..4 {
            time::advance(Duration::from_secs(5)).await;
            tokio::task::yield_now().await;
        }
        assert_eq!(store.len().await, 0);
        handle.abort();
    }

    #[tokio::test]
    async fn create_rejected_at_capacity() {
        let store = SessionStore::new(TTL, 3);
        for _ in 0..3 {
            store.create().await.unwrap();
        }
        assert!(matches!(store.create().await, Err(SessionError::Full)));
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_sessions_free_capacity() {
        let store = SessionStore::new(TTL, 2);
        store.create().await.unwrap();
        store.create().await.unwrap();
        time::advance(TTL).await;
        store.create().await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn second_attempt_is_busy_until_first_finishes() {
        let store = SessionStore::new(TTL, CAPACITY);
        let id = store.create().await.unwrap().session_id;

        let Attempt::Started(guard) = store.begin_attempt(id).await.unwrap() else {
            panic!("expected a fresh attempt");
        };
        assert!(matches!(
            store.begin_attempt(id).await,
            Err(SessionError::Busy)
        ));
        store.record(id, None).await.unwrap();
        drop(guard);
        assert!(matches!(
            store.begin_attempt(id).await,
            Ok(Attempt::Started(_))
        ));
    }

    #[tokio::test]
    async fn unlocked_session_needs_no_attempt() {
        let store = SessionStore::new(TTL, CAPACITY);
        let id = store.create().await.unwrap().session_id;
        store.record(id, Some(contact())).await.unwrap();
        let Attempt::Unlocked(view) = store.begin_attempt(id).await.unwrap() else {
            panic!("expected cached view");
        };
        assert_eq!(view.contact, Some(contact()));
        assert!(matches!(
            store.begin_attempt(Uuid::new_v4()).await,
            Err(SessionError::NotFound)
        ));
    }
}
