//! Conversation state store.
//!
//! The store is the only process-wide mutable state in the system. It
//! is keyed by user identifier with no cross-user sharing; the design
//! assumes no two messages for the same user are processed
//! concurrently.

use super::model::{Mode, UserSession};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// An abstract store mapping user identifiers to conversation state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for `user_id`, or an idle default if absent.
    async fn get(&self, user_id: &str) -> UserSession;

    /// Replaces the mode and slots for `user_id` atomically.
    async fn set(&self, user_id: &str, mode: Mode, slots: HashMap<String, String>);

    /// Merges `partial_slots` into the existing slots without changing the mode.
    async fn update(&self, user_id: &str, partial_slots: HashMap<String, String>);

    /// Resets the session to idle and drops all slots. Idempotent.
    async fn clear(&self, user_id: &str);
}

/// In-memory session store with TTL-based expiry.
///
/// A session whose last update is older than the TTL is treated as
/// abandoned and replaced with an idle default on the next access, so
/// stale mid-flow state cannot trap a returning user.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, UserSession>>,
    ttl: Option<Duration>,
}

impl InMemorySessionStore {
    /// Creates a store without expiry.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Creates a store whose sessions expire after `ttl` of inactivity.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    fn is_expired(&self, session: &UserSession) -> bool {
        match self.ttl {
            Some(ttl) => {
                let age = Utc::now().signed_duration_since(session.updated_at);
                age.to_std().map(|age| age > ttl).unwrap_or(false)
            }
            None => false,
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str) -> UserSession {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(user_id) {
                Some(session) if !self.is_expired(session) => return session.clone(),
                Some(_) => {}
                None => return UserSession::idle(user_id),
            }
        }

        // Expired: evict and hand back an idle default.
        debug!(user_id, "session expired, resetting to idle");
        let mut sessions = self.sessions.write().await;
        sessions.remove(user_id);
        UserSession::idle(user_id)
    }

    async fn set(&self, user_id: &str, mode: Mode, slots: HashMap<String, String>) {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| UserSession::idle(user_id));
        session.mode = mode;
        session.slots = slots;
        session.updated_at = now;
        debug!(user_id, mode = %mode, "session state set");
    }

    async fn update(&self, user_id: &str, partial_slots: HashMap<String, String>) {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| UserSession::idle(user_id));
        session.slots.extend(partial_slots);
        session.updated_at = Utc::now();
    }

    async fn clear(&self, user_id: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(user_id).is_some() {
            debug!(user_id, "session cleared");
        }
    }
}
