//! Core engines and persistence accessors
//!
//! The stores wrap one blob document each; the engines compose them with
//! the keyed lock table to run validated read-modify-write sequences.

pub mod ledger_store;
pub mod locks;
pub mod quota_store;
pub mod sell_engine;
pub mod session_store;
pub mod trade_engine;

pub use ledger_store::{LedgerMap, LedgerStore, PLAYER_LEDGER_KEY};
pub use locks::{KeyLock, LockTable};
pub use quota_store::{QuotaMap, QuotaStore, SELLS_BY_DAY_KEY};
pub use sell_engine::{SellEngine, SellItem, SellOutcome, SellStatus};
pub use session_store::{SessionMap, SessionStore, TRADE_SESSIONS_KEY};
pub use trade_engine::TradeEngine;
