//! Keyed lock table for per-player and per-session serialization
//!
//! Every mutating operation on a player or a trade session funnels through
//! the critical section for that key, so "read quota, compute remaining,
//! write quota" is atomic with respect to other writers of the same key.
//! Lock handles are backed by a `DashMap`, giving fine-grained locking
//! without a global mutex.
//!
//! Two families of keys exist: entity locks (`player:{id}`, `session:{id}`)
//! and document locks (`doc:{key}`). Entity locks serialize competing
//! actions on one player or session; document locks serialize every
//! load-modify-save cycle on a shared storage document, because two writers
//! holding different entity locks would otherwise overwrite each other's
//! whole-document saves.
//!
//! Lock ordering discipline: session lock, then the trade-session document,
//! then player locks in canonical (sorted) key order, then the ledger
//! document, then the quota document. Every path acquires along that order,
//! which rules out lock-order inversion between concurrent sells and trade
//! acceptances.

use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared table of named mutexes
#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Handle to one named lock; call [`KeyLock::lock`] to enter the section
pub struct KeyLock {
    inner: Arc<Mutex<()>>,
}

impl KeyLock {
    /// Block until the critical section for this key is entered
    ///
    /// A poisoned mutex is recovered rather than propagated: the protected
    /// state lives in the blob store, not inside the mutex, so a panicking
    /// holder cannot leave it torn.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LockTable {
    pub fn new() -> Self {
        LockTable::default()
    }

    /// Handle for the lock of a player key
    pub fn player(&self, player_id: &str) -> KeyLock {
        self.handle(&format!("player:{}", player_id))
    }

    /// Handle for the lock of a trade session key
    pub fn session(&self, session_id: &str) -> KeyLock {
        self.handle(&format!("session:{}", session_id))
    }

    /// Handle for the lock of a shared storage document
    ///
    /// Must be held for the whole load-modify-save cycle of that document;
    /// entity locks alone do not stop writers for other players from
    /// clobbering the save.
    pub fn document(&self, key: &str) -> KeyLock {
        self.handle(&format!("doc:{}", key))
    }

    /// Handles for two player locks in canonical acquisition order
    ///
    /// Callers must lock the first handle before the second. When both ids
    /// are equal only one handle is returned.
    pub fn player_pair(&self, a: &str, b: &str) -> (KeyLock, Option<KeyLock>) {
        if a == b {
            return (self.player(a), None);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        (self.player(first), Some(self.player(second)))
    }

    fn handle(&self, key: &str) -> KeyLock {
        let inner = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        KeyLock { inner }
    }
}
