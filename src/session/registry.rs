//! Session registry
//!
//! In-memory [`SessionStore`] behind the session cookie layer. Records idle for
//! longer than the configured lifetime are dropped on the next lookup.
//!
//! A record can only be written back while it is still registered: once a
//! session is deleted (logout) or re-keyed (login), a request that loaded it
//! earlier cannot bring it back.

use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tower_sessions::SessionStore;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;

#[derive(Debug)]
struct SessionEntry {
    record: Record,
    last_seen: Instant,
}

/// Registry for tracking live sessions
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Id, SessionEntry>>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Idle lifetime of a session
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Same lifetime, in the form the cookie layer expects.
    pub fn cookie_lifetime(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX))
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    fn is_live(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) < self.ttl
    }
}

#[async_trait]
impl SessionStore for SessionRegistry {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|_, entry| self.is_live(entry, now));
        let expired = before - sessions.len();
        if expired > 0 {
            debug!("Expired {} idle session(s)", expired);
        }

        while sessions.contains_key(&record.id) {
            record.id = Id::default();
        }
        sessions.insert(
            record.id,
            SessionEntry {
                record: record.clone(),
                last_seen: now,
            },
        );
        debug!("Created session ({} live)", sessions.len());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&record.id) {
            Some(entry) => {
                entry.record = record.clone();
                entry.last_seen = Instant::now();
            }
            None => debug!("Dropped write to a retired session"),
        }
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        let live = match sessions.get(id) {
            Some(entry) => self.is_live(entry, now),
            None => return Ok(None),
        };
        if !live {
            sessions.remove(id);
            debug!("Session expired after {:?} idle", self.ttl);
            return Ok(None);
        }

        Ok(sessions.get_mut(id).map(|entry| {
            entry.last_seen = now;
            entry.record.clone()
        }))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.sessions.lock().await.remove(id);
        Ok(())
    }
}
