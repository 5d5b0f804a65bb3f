//! Bearer-token sessions

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    /// `None` for sessions that never expire (fixture tokens)
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Maps bearer tokens to users
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new session with a fresh token
    async fn create(&self, user_id: &str) -> Session;

    /// Register an existing session, replacing any with the same token
    async fn restore(&self, session: Session);

    /// Look up a live session
    async fn get(&self, token: &str) -> Option<Session>;

    /// End a session; returns false if it did not exist
    async fn expire(&self, token: &str) -> bool;
}

pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Drop every expired session, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: Some(now + self.ttl),
        };
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        debug!(user = %user_id, "Session created");
        session
    }

    async fn restore(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
    }

    async fn get(&self, token: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.is_expired(Utc::now()) {
            self.sessions.write().await.remove(token);
            debug!(user = %session.user_id, "Session expired");
            return None;
        }
        Some(session)
    }

    async fn expire(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}
