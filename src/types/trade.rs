//! Trade session types
//!
//! A trade session is a bounded two-party negotiation: the initiator picks up
//! to three of their own cards, then up to three of the partner's, then the
//! partner accepts or denies. Stages form a closed enumeration with an
//! explicit transition table; handlers never branch on raw strings.

use super::card::CardId;
use super::ledger::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of cards on either side of a trade
pub const SELECTION_LIMIT: usize = 3;

/// Protocol stage of a trade session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStage {
    /// Initiator picks from their own collection
    PickMine,
    /// Initiator picks from the partner's collection
    PickTheirs,
    /// Partner accepts or denies; both selections are frozen
    Decision,
    /// Terminal: swap applied
    Accepted,
    /// Terminal: no mutation occurred
    Denied,
}

impl TradeStage {
    /// Whether this stage is terminal (no further actions permitted)
    pub fn is_terminal(self) -> bool {
        matches!(self, TradeStage::Accepted | TradeStage::Denied)
    }

    /// The stage that follows a successful selection in this stage
    ///
    /// Returns `None` for stages where a selection is not a valid action.
    pub fn after_selection(self) -> Option<TradeStage> {
        match self {
            TradeStage::PickMine => Some(TradeStage::PickTheirs),
            TradeStage::PickTheirs => Some(TradeStage::Decision),
            TradeStage::Decision | TradeStage::Accepted | TradeStage::Denied => None,
        }
    }
}

impl fmt::Display for TradeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeStage::PickMine => "pick_mine",
            TradeStage::PickTheirs => "pick_theirs",
            TradeStage::Decision => "decision",
            TradeStage::Accepted => "accepted",
            TradeStage::Denied => "denied",
        };
        f.write_str(s)
    }
}

/// A participant's role in a session, resolved server-side
///
/// Never taken from caller input: the caller's resolved identity is compared
/// against the session's stored participant ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeRole {
    Initiator,
    Partner,
}

/// The partner's binding decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDecision {
    Accept,
    Deny,
}

/// One side of a trade: a participant and their card selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSide {
    pub player_id: PlayerId,

    /// Selected card ids; duplicates allowed up to ownership, length capped
    /// at [`SELECTION_LIMIT`]
    #[serde(default)]
    pub selection: Vec<CardId>,
}

impl TradeSide {
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        TradeSide {
            player_id: player_id.into(),
            selection: Vec::new(),
        }
    }
}

/// A two-party trade session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSession {
    pub session_id: String,
    pub initiator: TradeSide,
    pub partner: TradeSide,
    pub stage: TradeStage,
    pub created_at: DateTime<Utc>,
}

impl TradeSession {
    /// Create a new session in the initial stage
    pub fn new(
        session_id: impl Into<String>,
        initiator: impl Into<PlayerId>,
        partner: impl Into<PlayerId>,
    ) -> Self {
        TradeSession {
            session_id: session_id.into(),
            initiator: TradeSide::new(initiator),
            partner: TradeSide::new(partner),
            stage: TradeStage::PickMine,
            created_at: Utc::now(),
        }
    }

    /// Resolve the caller's role from their identity, if they have one
    pub fn role_of(&self, player_id: &str) -> Option<TradeRole> {
        if self.initiator.player_id == player_id {
            Some(TradeRole::Initiator)
        } else if self.partner.player_id == player_id {
            Some(TradeRole::Partner)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TradeStage::PickMine, Some(TradeStage::PickTheirs))]
    #[case(TradeStage::PickTheirs, Some(TradeStage::Decision))]
    #[case(TradeStage::Decision, None)]
    #[case(TradeStage::Accepted, None)]
    #[case(TradeStage::Denied, None)]
    fn test_selection_transition_table(
        #[case] stage: TradeStage,
        #[case] expected: Option<TradeStage>,
    ) {
        assert_eq!(stage.after_selection(), expected);
    }

    #[test]
    fn test_terminal_stages() {
        assert!(TradeStage::Accepted.is_terminal());
        assert!(TradeStage::Denied.is_terminal());
        assert!(!TradeStage::Decision.is_terminal());
        assert!(!TradeStage::PickMine.is_terminal());
    }

    #[test]
    fn test_role_resolution() {
        let session = TradeSession::new("t1", "alice", "bob");
        assert_eq!(session.role_of("alice"), Some(TradeRole::Initiator));
        assert_eq!(session.role_of("bob"), Some(TradeRole::Partner));
        assert_eq!(session.role_of("mallory"), None);
    }

    #[test]
    fn test_new_session_starts_at_pick_mine() {
        let session = TradeSession::new("t1", "alice", "bob");
        assert_eq!(session.stage, TradeStage::PickMine);
        assert!(session.initiator.selection.is_empty());
        assert!(session.partner.selection.is_empty());
    }

    #[test]
    fn test_stage_wire_format() {
        assert_eq!(
            serde_json::to_string(&TradeStage::PickTheirs).unwrap(),
            "\"pick_theirs\""
        );
        let stage: TradeStage = serde_json::from_str("\"decision\"").unwrap();
        assert_eq!(stage, TradeStage::Decision);
    }
}
