//! Player ledger persistence
//!
//! All player ledger entries live in one stored document (key
//! `player_ledger`, a map of player id to entry). Keeping both sides of a
//! trade in the same document means the four-way ownership swap of an
//! acceptance lands in a single `save`, so the dual write can never be
//! half-applied at the storage layer.
//!
//! The store itself is stateless: every request reads the document fresh,
//! mutates a copy under the caller's keyed lock, and writes it back.

use crate::storage::{self, BlobStore};
use crate::types::{EconomyError, PlayerId, PlayerLedgerEntry};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Full ledger document: player id to entry
pub type LedgerMap = BTreeMap<PlayerId, PlayerLedgerEntry>;

/// Storage key the ledger document lives under
pub const PLAYER_LEDGER_KEY: &str = "player_ledger";

/// Read-modify-write access to the player ledger document
#[derive(Clone)]
pub struct LedgerStore {
    store: Arc<dyn BlobStore>,
}

impl LedgerStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        LedgerStore { store }
    }

    /// Load the full ledger document (empty map if never written)
    pub fn load_all(&self) -> Result<LedgerMap, EconomyError> {
        storage::load_map(self.store.as_ref(), PLAYER_LEDGER_KEY)
    }

    /// Persist the full ledger document
    pub fn save_all(&self, map: &LedgerMap) -> Result<(), EconomyError> {
        storage::save_map(self.store.as_ref(), PLAYER_LEDGER_KEY, map)
    }

    /// Load a single player's entry
    pub fn get(&self, player_id: &str) -> Result<Option<PlayerLedgerEntry>, EconomyError> {
        Ok(self.load_all()?.get(player_id).cloned())
    }

    /// Insert or replace a player's entry (first observation, seeding, admin)
    pub fn upsert(&self, entry: PlayerLedgerEntry) -> Result<(), EconomyError> {
        let mut map = self.load_all()?;
        map.insert(entry.player_id.clone(), entry);
        self.save_all(&map)
    }
}
