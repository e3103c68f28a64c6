//! Error types for the card economy engine
//!
//! Every failure a request can hit maps to one closed error kind with a
//! stable wire code. Validation failures (ownership, quota, stage mismatch)
//! are recovered locally and returned as structured failures; only storage
//! trouble surfaces as `STORAGE_UNAVAILABLE`. No error ever leaves the ledger
//! or quota store partially mutated.

use super::trade::TradeStage;
use thiserror::Error;

/// Main error type for sell and trade operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomyError {
    /// No ledger entry exists for the player
    #[error("player '{player_id}' not found")]
    PlayerNotFound {
        /// The player id that was looked up
        player_id: String,
    },

    /// The request carried no resolvable player identity
    #[error("request carries no player identity")]
    MissingIdentity,

    /// A trade was opened against the opener's own identity
    #[error("a trade needs two distinct participants")]
    SelfTrade,

    /// The sell request contained no positive quantity
    #[error("nothing to sell: no positive quantity in request")]
    NothingToSell,

    /// The request would exceed the player's remaining daily quota
    ///
    /// The whole request is rejected; there is no partial auto-clamping at
    /// the quota gate.
    #[error("daily sell limit reached: requested {requested}, remaining {remaining}")]
    DailyLimitReached {
        /// Total units requested across all items
        requested: u32,
        /// Units still allowed today
        remaining: u32,
    },

    /// After ownership clamping, nothing was left to sell or trade
    #[error("player owns none of the requested cards")]
    NoOwnership,

    /// The action is not permitted in the session's current stage
    #[error("action '{action}' not permitted in stage '{stage}'")]
    InvalidStage {
        /// The attempted action
        action: String,
        /// The session's current stage
        stage: TradeStage,
    },

    /// The caller has no role in the session
    #[error("player '{player_id}' is not a participant of session '{session_id}'")]
    NotParticipant {
        player_id: String,
        session_id: String,
    },

    /// The selection exceeds the per-side card cap
    #[error("selection of {given} cards exceeds the limit of {limit}")]
    SelectionTooLarge { given: usize, limit: usize },

    /// No trade session exists with the given id
    #[error("trade session '{session_id}' not found")]
    SessionNotFound { session_id: String },

    /// The storage collaborator failed; the caller decides whether to retry
    #[error("storage unavailable: {message}")]
    StorageUnavailable { message: String },
}

impl EconomyError {
    /// Stable wire code for this error kind
    pub fn kind(&self) -> &'static str {
        match self {
            EconomyError::PlayerNotFound { .. } => "PLAYER_NOT_FOUND",
            EconomyError::MissingIdentity => "MISSING_IDENTITY",
            EconomyError::SelfTrade => "SELF_TRADE",
            EconomyError::NothingToSell => "NOTHING_TO_SELL",
            EconomyError::DailyLimitReached { .. } => "DAILY_LIMIT_REACHED",
            EconomyError::NoOwnership => "NO_OWNERSHIP",
            EconomyError::InvalidStage { .. } => "INVALID_STAGE",
            EconomyError::NotParticipant { .. } => "NOT_PARTICIPANT",
            EconomyError::SelectionTooLarge { .. } => "SELECTION_TOO_LARGE",
            EconomyError::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            EconomyError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }

    /// Create a PlayerNotFound error
    pub fn player_not_found(player_id: &str) -> Self {
        EconomyError::PlayerNotFound {
            player_id: player_id.to_string(),
        }
    }

    /// Create a DailyLimitReached error
    pub fn daily_limit_reached(requested: u32, remaining: u32) -> Self {
        EconomyError::DailyLimitReached {
            requested,
            remaining,
        }
    }

    /// Create an InvalidStage error
    pub fn invalid_stage(action: &str, stage: TradeStage) -> Self {
        EconomyError::InvalidStage {
            action: action.to_string(),
            stage,
        }
    }

    /// Create a NotParticipant error
    pub fn not_participant(player_id: &str, session_id: &str) -> Self {
        EconomyError::NotParticipant {
            player_id: player_id.to_string(),
            session_id: session_id.to_string(),
        }
    }

    /// Create a SelectionTooLarge error
    pub fn selection_too_large(given: usize, limit: usize) -> Self {
        EconomyError::SelectionTooLarge { given, limit }
    }

    /// Create a SessionNotFound error
    pub fn session_not_found(session_id: &str) -> Self {
        EconomyError::SessionNotFound {
            session_id: session_id.to_string(),
        }
    }

    /// Create a StorageUnavailable error
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        EconomyError::StorageUnavailable {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for EconomyError {
    fn from(error: std::io::Error) -> Self {
        EconomyError::StorageUnavailable {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for EconomyError {
    fn from(error: serde_json::Error) -> Self {
        EconomyError::StorageUnavailable {
            message: format!("blob decode failed: {}", error),
        }
    }
}
