//! Daily quota persistence
//!
//! One stored document (key `sells_by_day`) maps player id to a per-day
//! counter map. Mutated only by successful sells; day rollover is implicit
//! because a fresh UTC day key reads as zero.

use crate::storage::{self, BlobStore};
use crate::types::{DailyQuotaEntry, EconomyError, PlayerId};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Full quota document: player id to daily counters
pub type QuotaMap = BTreeMap<PlayerId, DailyQuotaEntry>;

/// Storage key the quota document lives under
pub const SELLS_BY_DAY_KEY: &str = "sells_by_day";

/// Read-modify-write access to the daily quota document
#[derive(Clone)]
pub struct QuotaStore {
    store: Arc<dyn BlobStore>,
}

impl QuotaStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        QuotaStore { store }
    }

    /// Load the full quota document (empty map if never written)
    pub fn load_all(&self) -> Result<QuotaMap, EconomyError> {
        storage::load_map(self.store.as_ref(), SELLS_BY_DAY_KEY)
    }

    /// Persist the full quota document
    pub fn save_all(&self, map: &QuotaMap) -> Result<(), EconomyError> {
        storage::save_map(self.store.as_ref(), SELLS_BY_DAY_KEY, map)
    }

    /// Units the player sold on the given day key
    pub fn sold_on(&self, player_id: &str, day_key: &str) -> Result<u32, EconomyError> {
        Ok(self
            .load_all()?
            .get(player_id)
            .map(|entry| entry.sold_on(day_key))
            .unwrap_or(0))
    }
}
