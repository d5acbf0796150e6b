use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{CallSession, SessionError, SessionStore};

/// In-process session map. Expired entries are dropped lazily on access.
#[derive(Debug)]
pub struct MemorySessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, CallSession)>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

fn poisoned<T>(_: T) -> SessionError {
    SessionError::Unavailable("session map lock poisoned".to_string())
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, call_sid: &str) -> Result<Option<CallSession>, SessionError> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        let now = Instant::now();
        entries.retain(|_, (expires_at, _)| *expires_at > now);
        Ok(entries.get(call_sid).map(|(_, session)| session.clone()))
    }

    async fn save(&self, session: &CallSession) -> Result<(), SessionError> {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(session.call_sid.clone(), (expires_at, session.clone()));
        Ok(())
    }

    async fn clear(&self, call_sid: &str) -> Result<(), SessionError> {
        self.entries.lock().map_err(poisoned)?.remove(call_sid);
        Ok(())
    }
}
