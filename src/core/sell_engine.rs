//! Sell engine
//!
//! Validates and executes sell requests against the ledger and quota
//! documents. Three operations:
//!
//! - `preview_sell`: price a basket without consulting ownership or quota
//! - `sell_status`: today's quota usage and the next reset instant
//! - `execute_sell`: the real thing, serialized per player
//!
//! `execute_sell` rejects whole requests that exceed the remaining daily
//! quota, clamps each line to the player's owned count, rounds the credited
//! amount once at the end, and applies balance, collection, and quota
//! mutations as one logical unit.

use crate::catalog::CardCatalog;
use crate::core::ledger_store::{LedgerStore, PLAYER_LEDGER_KEY};
use crate::core::locks::LockTable;
use crate::core::quota_store::{QuotaStore, SELLS_BY_DAY_KEY};
use crate::types::{day_key_utc, next_utc_midnight_iso, round_cents, CardId, EconomyError};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One line of a sell request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellItem {
    /// Card to sell; payloads may also use the legacy `number` field name
    #[serde(alias = "number")]
    pub card_id: CardId,

    /// Requested quantity; non-positive values are ignored
    #[serde(default)]
    pub qty: i64,
}

/// Result of a successful `execute_sell`
#[derive(Debug, Clone, PartialEq)]
pub struct SellOutcome {
    /// Amount credited, rounded to cents
    pub credited: Decimal,
    /// Units actually sold after ownership clamping
    pub sold_count: u32,
    /// Balance after the credit
    pub new_balance: Decimal,
    /// Collection after the decrement
    pub owned_counts: BTreeMap<CardId, u32>,
}

/// Snapshot of a player's daily quota position
#[derive(Debug, Clone, PartialEq)]
pub struct SellStatus {
    pub sold_today: u32,
    pub remaining: u32,
    pub limit: u32,
    /// Next UTC midnight, when the counter implicitly resets
    pub reset_at: String,
}

/// Requested quantity, clamped to a sane non-negative range
fn sellable_qty(qty: i64) -> u32 {
    qty.clamp(0, 9_999) as u32
}

/// Sell engine over the ledger and quota documents
pub struct SellEngine {
    catalog: Arc<CardCatalog>,
    ledger: LedgerStore,
    quota: QuotaStore,
    locks: Arc<LockTable>,
    daily_limit: u32,
}

impl SellEngine {
    pub fn new(
        catalog: Arc<CardCatalog>,
        ledger: LedgerStore,
        quota: QuotaStore,
        locks: Arc<LockTable>,
        daily_limit: u32,
    ) -> Self {
        SellEngine {
            catalog,
            ledger,
            quota,
            locks,
            daily_limit,
        }
    }

    /// The configured daily sell limit
    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Price a basket without touching ownership or quota
    ///
    /// Purely informational: no side effects, safe to retry at will, and
    /// two identical calls with no intervening sell yield identical output.
    /// The result is rounded to cents once, at the end.
    pub fn preview_sell(&self, items: &[SellItem]) -> Result<Decimal, EconomyError> {
        let mut credited = Decimal::ZERO;
        for item in items {
            let qty = sellable_qty(item.qty);
            if qty == 0 {
                continue;
            }
            credited += self.catalog.price_of(&item.card_id) * Decimal::from(qty);
        }
        Ok(round_cents(credited))
    }

    /// Today's quota position for a player
    pub fn sell_status(&self, player_id: &str) -> Result<SellStatus, EconomyError> {
        if player_id.is_empty() {
            return Err(EconomyError::MissingIdentity);
        }
        if self.ledger.get(player_id)?.is_none() {
            return Err(EconomyError::player_not_found(player_id));
        }

        let now = Utc::now();
        let sold_today = self.quota.sold_on(player_id, &day_key_utc(now))?;
        Ok(SellStatus {
            sold_today,
            remaining: self.daily_limit.saturating_sub(sold_today),
            limit: self.daily_limit,
            reset_at: next_utc_midnight_iso(now),
        })
    }

    /// Validate and execute a sell, serialized per player
    ///
    /// The quota gate rejects the whole request when the requested total
    /// exceeds what is left today; there is no partial clamping at that
    /// step. Ownership clamping happens per line afterwards. Quota persists
    /// before the ledger so a mid-sequence storage failure can only
    /// under-sell, never over-sell.
    pub fn execute_sell(
        &self,
        player_id: &str,
        items: &[SellItem],
    ) -> Result<SellOutcome, EconomyError> {
        if player_id.is_empty() {
            return Err(EconomyError::MissingIdentity);
        }

        let key = self.locks.player(player_id);
        let _guard = key.lock();
        // Both shared documents get a full read-modify-write below; holding
        // their locks keeps writers for other players from overwriting this
        // save with a stale snapshot.
        let ledger_doc = self.locks.document(PLAYER_LEDGER_KEY);
        let _ledger_doc_guard = ledger_doc.lock();
        let quota_doc = self.locks.document(SELLS_BY_DAY_KEY);
        let _quota_doc_guard = quota_doc.lock();

        let mut ledger_map = self.ledger.load_all()?;
        let entry = ledger_map
            .get(player_id)
            .cloned()
            .ok_or_else(|| EconomyError::player_not_found(player_id))?;

        let now = Utc::now();
        let day_key = day_key_utc(now);
        let mut quota_map = self.quota.load_all()?;
        let sold_today = quota_map
            .get(player_id)
            .map(|q| q.sold_on(&day_key))
            .unwrap_or(0);
        let remaining = self.daily_limit.saturating_sub(sold_today);

        let requested: u32 = items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(sellable_qty(item.qty)));
        if requested == 0 {
            return Err(EconomyError::NothingToSell);
        }
        if requested > remaining {
            return Err(EconomyError::daily_limit_reached(requested, remaining));
        }

        // Clamp each line to the owned count and accumulate the credit.
        // Working on a copy keeps failures from touching the real entry.
        let mut working = entry.clone();
        let mut credited = Decimal::ZERO;
        let mut sold_count: u32 = 0;
        for item in items {
            let want = sellable_qty(item.qty);
            if want == 0 {
                continue;
            }
            let sold = working.remove_cards(&item.card_id, want);
            if sold == 0 {
                continue;
            }
            credited += self.catalog.price_of(&item.card_id) * Decimal::from(sold);
            sold_count += sold;
        }

        if sold_count == 0 {
            return Err(EconomyError::NoOwnership);
        }
        // Defensive re-clamp; the quota gate above already guarantees this
        sold_count = sold_count.min(remaining);

        let credited = round_cents(credited);
        working.credit(credited);
        let new_balance = working.balance;
        let owned_counts = working.owned_counts.clone();

        quota_map
            .entry(player_id.to_string())
            .or_default()
            .record(&day_key, sold_count);
        ledger_map.insert(player_id.to_string(), working);

        self.quota.save_all(&quota_map)?;
        if let Err(e) = self.ledger.save_all(&ledger_map) {
            tracing::error!(
                player_id,
                sold_count,
                error = %e,
                "quota advanced but ledger write failed; sell not applied"
            );
            return Err(e);
        }

        tracing::info!(player_id, sold_count, credited = %credited, "sell executed");

        Ok(SellOutcome {
            credited,
            sold_count,
            new_balance,
            owned_counts,
        })
    }
}
