use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;

use super::SessionStore;
use crate::error::{Error, Result};
use crate::types::{Principal, Session};

const SESSION_ID_LENGTH: usize = 48;

/// In-process session map. Sessions do not survive a restart.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: chrono::Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Result<Self> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Config(format!("invalid session ttl: {e}")))?;
        Ok(Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}

impl SessionStore for MemorySessionStore {
    fn create(&self, principal: Principal) -> Result<Session> {
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut id = generate_session_id();
        while sessions.contains_key(&id) {
            id = generate_session_id();
        }

        let session = Session {
            id: id.clone(),
            principal,
            created_at: now,
            expires_at: now + self.ttl,
        };
        sessions.insert(id, session.clone());

        Ok(session)
    }

    fn resolve(&self, id: &str) -> Result<Option<Session>> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            match sessions.get(id) {
                None => return Ok(None),
                Some(session) if !session.is_expired(now) => return Ok(Some(session.clone())),
                Some(_) => {}
            }
        }

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        Ok(None)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some())
    }

    fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        Ok(before - sessions.len())
    }
}
