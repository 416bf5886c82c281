use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration as StdDuration;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;

use crate::metrics::SESSIONS_ACTIVE;
use crate::models::EntityId;
use crate::services::AppState;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store unavailable")]
    Unavailable,
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: EntityId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Server-side login sessions: opaque cookie token -> user id.
/// Expiry slides forward every time a session is used.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self, user_id: EntityId) -> Result<String, SessionError> {
        let token = generate_session_token();
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable)?;
        sessions.insert(
            token.clone(),
            SessionRecord {
                user_id,
                created_at: now,
                expires_at: now + self.ttl,
            },
        );
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        tracing::debug!("Session created for user {}", user_id);
        Ok(token)
    }

    /// User behind `token`, if the session exists and has not expired.
    pub fn resolve(&self, token: &str) -> Result<Option<EntityId>, SessionError> {
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable)?;

        let Some(record) = sessions.get_mut(token) else {
            return Ok(None);
        };
        if record.expires_at <= now {
            let age = now - record.created_at;
            sessions.remove(token);
            SESSIONS_ACTIVE.set(sessions.len() as i64);
            tracing::debug!("Session expired after {}s", age.num_seconds());
            return Ok(None);
        }

        record.expires_at = now + self.ttl;
        Ok(Some(record.user_id))
    }

    /// Returns whether a session was removed.
    pub fn destroy(&self, token: &str) -> Result<bool, SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable)?;
        let removed = sessions.remove(token).is_some();
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        Ok(removed)
    }

    /// Drops expired sessions, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable)?;
        let before = sessions.len();
        sessions.retain(|_, record| record.expires_at > now);
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        Ok(before - sessions.len())
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

/// Sweeps expired sessions on a fixed interval.
pub fn spawn_session_reaper(
    state: Arc<AppState>,
    every: StdDuration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match state.sessions.purge_expired() {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Purged {} expired sessions", removed),
                Err(e) => tracing::error!("Session purge failed: {}", e),
            }
        }
    })
}

fn generate_session_token() -> String {
    let random_bytes: [u8; 32] = rand::rng().random();
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_resolve_destroy() {
        let store = SessionStore::new(Duration::hours(1));
        let token = store.create(7).unwrap();

        assert_eq!(store.resolve(&token).unwrap(), Some(7));
        assert_eq!(store.active_count(), 1);

        assert!(store.destroy(&token).unwrap());
        assert_eq!(store.resolve(&token).unwrap(), None);
        assert!(!store.destroy(&token).unwrap());
    }

    #[test]
    fn test_unknown_token() {
        let store = SessionStore::new(Duration::hours(1));
        assert_eq!(store.resolve("not-a-session").unwrap(), None);
    }

    #[test]
    fn test_expired_sessions_are_rejected_and_purged() {
        let store = SessionStore::new(Duration::zero());
        let first = store.create(1).unwrap();
        store.create(2).unwrap();

        assert_eq!(store.resolve(&first).unwrap(), None);
        assert_eq!(store.purge_expired().unwrap(), 1);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
