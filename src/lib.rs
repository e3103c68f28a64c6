//! Card Economy Engine Library
//! # Overview
//!
//! This library implements the server-side economy for a collectible-card
//! game: an append-style player ledger with rarity-based sell pricing and a
//! rolling daily sell quota, plus a staged two-party trade protocol with an
//! explicit accept-or-deny decision.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (CardId, PlayerLedgerEntry, TradeSession, etc.)
//! - [`catalog`] - Card master index and rarity pricing
//! - [`storage`] - Pluggable JSON blob persistence (file, memory, layered fallback)
//! - [`core`] - Business logic components:
//!   - [`core::sell_engine`] - Sell validation, quota gating, and execution
//!   - [`core::trade_engine`] - Trade session protocol and ownership swaps
//!   - [`core::locks`] - Keyed lock table serializing read-modify-write cycles
//! - [`api`] - HTTP surface over the engines
//! - [`cli`] - CLI argument parsing
//!
//! # Sell Rules
//!
//! Each card prices by rarity (Legendary 3.00, Rare 2.00, Uncommon 1.00,
//! Common 0.50; unknown rarities fail open to 0.50). A request is rejected
//! in full when its total exceeds the player's remaining daily quota;
//! per-card quantities are clamped to actual ownership. Credits round to
//! cents once, at the end.
//!
//! # Trade Protocol
//!
//! The initiator selects up to three of their own cards, then up to three of
//! the partner's; the partner accepts or denies. Acceptance re-validates
//! both selections against current ownership and applies the four-way swap
//! as a single ledger write. Denial finalizes without mutation.

// Module declarations
pub mod api;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod storage;
pub mod types;

pub use catalog::CardCatalog;
pub use core::{LedgerStore, LockTable, QuotaStore, SellEngine, SessionStore, TradeEngine};
pub use storage::{BlobStore, FileStore, LayeredStore, MemoryStore};
pub use types::{
    CardId, CardMasterRecord, EconomyError, PlayerId, PlayerLedgerEntry, Rarity, TradeDecision,
    TradeSession, TradeStage,
};
