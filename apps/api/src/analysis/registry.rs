use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::analysis::session::Session;

/// Sessions idle longer than this are dropped when new sessions are opened.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Live sessions keyed by id. Each session sits behind its own lock so one
/// user's action never waits on another's.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
}

impl SessionRegistry {
    pub async fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id();

        let mut sessions = self.sessions.write().await;
        // A session that is locked right now is in use, never stale.
        sessions.retain(|_, s| {
            s.try_lock()
                .map(|s| s.idle_for() < SESSION_IDLE_TIMEOUT)
                .unwrap_or(true)
        });
        sessions.insert(id, Arc::new(Mutex::new(session)));
        debug!("Opened session {id} ({} live)", sessions.len());
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Discards the session and its form data. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
