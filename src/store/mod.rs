mod memory;

pub use memory::MemorySessionStore;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::Result;
use crate::types::{Principal, Session};

/// SessionStore maps opaque session ids to authenticated principals.
pub trait SessionStore: Send + Sync {
    /// Creates a fresh session for a principal that has completed the OAuth handshake.
    fn create(&self, principal: Principal) -> Result<Session>;

    /// Returns the live session for `id`. Expired sessions resolve as absent.
    fn resolve(&self, id: &str) -> Result<Option<Session>>;

    /// Removes a session. Returns whether anything was removed.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Drops every expired session and returns how many were removed.
    fn purge_expired(&self) -> Result<usize>;
}

/// Periodically evicts expired sessions until the returned task is aborted.
pub fn spawn_session_reaper(store: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.purge_expired() {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Evicted {n} expired sessions"),
                Err(e) => tracing::warn!("Failed to evict expired sessions: {e}"),
            }
        }
    })
}
