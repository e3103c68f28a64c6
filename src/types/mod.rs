//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `card`: Card identity, rarity, and master-catalog record types
//! - `ledger`: Per-player balance and collection types
//! - `quota`: Daily sell counters and UTC day bookkeeping
//! - `trade`: Trade session, stage, and role types
//! - `error`: Error kinds for the economy engine

pub mod card;
pub mod error;
pub mod ledger;
pub mod quota;
pub mod trade;

pub use card::{CardId, CardMasterRecord, Rarity};
pub use error::EconomyError;
pub use ledger::{round_cents, PlayerId, PlayerLedgerEntry};
pub use quota::{day_key_utc, next_utc_midnight_iso, DailyQuotaEntry};
pub use trade::{
    TradeDecision, TradeRole, TradeSession, TradeSide, TradeStage, SELECTION_LIMIT,
};
