//! Player ledger types
//!
//! A ledger entry is the per-player economic record: a currency balance with
//! 2-decimal precision and a map of owned card counts. Entries are created on
//! first observation of a player and never deleted. Only the sell engine and
//! a completed trade mutate them.

use super::card::CardId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Player identifier (opaque, assigned by the identity layer)
pub type PlayerId = String;

/// Round a currency amount to whole cents, half-up at the midpoint
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Per-player economic record
///
/// Invariants: `balance` is never negative and no `owned_counts` value is
/// ever negative (enforced by construction, counts are unsigned and every
/// decrement is clamped to the current count first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLedgerEntry {
    /// The player this entry belongs to
    pub player_id: PlayerId,

    /// Display name, for response payloads only
    #[serde(default)]
    pub display_name: String,

    /// Currency balance, 2-decimal precision
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,

    /// Owned card counts, keyed by normalized card id
    ///
    /// A zero count is equivalent to absence; both mean "owns none".
    #[serde(default)]
    pub owned_counts: BTreeMap<CardId, u32>,
}

impl PlayerLedgerEntry {
    /// Create a fresh entry with zero balance and an empty collection
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        PlayerLedgerEntry {
            player_id: player_id.into(),
            display_name: String::new(),
            balance: Decimal::ZERO,
            owned_counts: BTreeMap::new(),
        }
    }

    /// How many copies of a card the player currently owns
    pub fn owned(&self, card_id: &CardId) -> u32 {
        self.owned_counts.get(card_id).copied().unwrap_or(0)
    }

    /// Remove up to `qty` copies of a card, returning how many were removed
    ///
    /// Clamps to the currently owned count so the stored value can never go
    /// negative. Entries that reach zero are kept at zero, matching the
    /// stored blob shape the UI expects.
    pub fn remove_cards(&mut self, card_id: &CardId, qty: u32) -> u32 {
        let have = self.owned(card_id);
        let taken = qty.min(have);
        if taken > 0 {
            self.owned_counts.insert(card_id.clone(), have - taken);
        }
        taken
    }

    /// Add `qty` copies of a card
    pub fn add_cards(&mut self, card_id: &CardId, qty: u32) {
        if qty == 0 {
            return;
        }
        let count = self.owned_counts.entry(card_id.clone()).or_insert(0);
        *count = count.saturating_add(qty);
    }

    /// Credit an amount to the balance, rounding the result to cents
    pub fn credit(&mut self, amount: Decimal) {
        self.balance = round_cents(self.balance + amount);
    }
}
