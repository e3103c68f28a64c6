//! Trade session persistence
//!
//! Sessions live in one stored document (key `trade_sessions`) mapping
//! session id to session record. Terminal sessions are kept in place as an
//! archive; nothing in the protocol ever reactivates them.

use crate::storage::{self, BlobStore};
use crate::types::{EconomyError, TradeSession};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Full session document: session id to session
pub type SessionMap = BTreeMap<String, TradeSession>;

/// Storage key the session document lives under
pub const TRADE_SESSIONS_KEY: &str = "trade_sessions";

static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Read-modify-write access to the trade session document
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn BlobStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        SessionStore { store }
    }

    /// Load the full session document (empty map if never written)
    pub fn load_all(&self) -> Result<SessionMap, EconomyError> {
        storage::load_map(self.store.as_ref(), TRADE_SESSIONS_KEY)
    }

    /// Persist the full session document
    pub fn save_all(&self, map: &SessionMap) -> Result<(), EconomyError> {
        storage::save_map(self.store.as_ref(), TRADE_SESSIONS_KEY, map)
    }

    /// Load a single session
    pub fn get(&self, session_id: &str) -> Result<Option<TradeSession>, EconomyError> {
        Ok(self.load_all()?.get(session_id).cloned())
    }

    /// Mint a session id unique within this process and epoch
    pub fn next_session_id() -> String {
        let seq = SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
        format!(
            "trade-{}-{:04}",
            chrono::Utc::now().timestamp_millis(),
            seq % 10_000
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_get_missing_session() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(sessions.get("nope").unwrap(), None);
    }

    #[test]
    fn test_round_trip_session() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let session = TradeSession::new("t1", "alice", "bob");

        let mut map = sessions.load_all().unwrap();
        map.insert(session.session_id.clone(), session.clone());
        sessions.save_all(&map).unwrap();

        assert_eq!(sessions.get("t1").unwrap(), Some(session));
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionStore::next_session_id();
        let b = SessionStore::next_session_id();
        assert_ne!(a, b);
        assert!(a.starts_with("trade-"));
    }
}
