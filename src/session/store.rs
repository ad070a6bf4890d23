//! Process-wide session store
//!
//! Sessions are isolated from each other. Each sits behind its own mutex,
//! held for the whole of a submission, so a session handles one
//! interaction at a time while other sessions proceed.
//!
//! Nothing ends a session from the browser side, so sessions left idle past
//! the configured TTL are dropped by a periodic sweep.

use super::Session;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh session
    pub async fn create(&self) -> (Uuid, SharedSession) {
        let session = Session::new();
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        tracing::debug!(session = %id, "Session created");
        (id, shared)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session and everything it holds
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, "Session ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session idle for longer than `ttl`. Returns how many went.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(Instant::now(), ttl).await
    }

    async fn evict_idle_at(&self, now: Instant, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            // A locked session is mid-submission, so it is in use
            let Ok(session) = session.try_lock() else {
                return true;
            };
            let idle = session.is_idle(now, ttl);
            if idle {
                tracing::debug!(session = %id, "Session expired");
            }
            !idle
        });
        before - sessions.len()
    }

    /// Sweep idle sessions every `every` for the life of the process.
    pub fn start_idle_sweeper(self: &Arc<Self>, ttl: Duration, every: Duration) {
        let store = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            tracing::info!(ttl_secs = ttl.as_secs(), "Session sweeper started");

            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    let remaining = store.len().await;
                    tracing::info!(evicted, remaining, "Expired idle sessions");
                }
            }
        });
    }
}
