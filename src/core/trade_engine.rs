//! Trade engine
//!
//! Drives two-party trade sessions through their staged protocol. The
//! initiator makes both selections (their own cards, then the partner's),
//! the partner renders the binding accept-or-deny verdict. Roles are always
//! resolved server-side from the session record; stage and role checks
//! happen before any ownership work.
//!
//! Acceptance is the only point where the ledger moves. Both selections are
//! re-validated against current ownership at that moment and silently
//! clamped, so cards sold between selection and acceptance simply drop out
//! of the swap instead of failing it.

use crate::core::ledger_store::{LedgerStore, PLAYER_LEDGER_KEY};
use crate::core::locks::LockTable;
use crate::core::session_store::{SessionStore, TRADE_SESSIONS_KEY};
use crate::types::{
    CardId, EconomyError, PlayerLedgerEntry, TradeDecision, TradeRole, TradeSession, TradeStage,
    SELECTION_LIMIT,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Multiset ownership check: every card in the selection must be covered by
/// the entry's owned counts, duplicates included
fn selection_is_owned(entry: Option<&PlayerLedgerEntry>, selection: &[CardId]) -> bool {
    let Some(entry) = entry else {
        return selection.is_empty();
    };
    let mut needed: BTreeMap<&CardId, u32> = BTreeMap::new();
    for card in selection {
        *needed.entry(card).or_insert(0) += 1;
    }
    needed.iter().all(|(card, count)| entry.owned(card) >= *count)
}

/// Drop selection entries no longer covered by current ownership
fn clamp_selection(entry: &PlayerLedgerEntry, selection: &[CardId]) -> Vec<CardId> {
    let mut budget: BTreeMap<&CardId, u32> = BTreeMap::new();
    selection
        .iter()
        .filter(|&card| {
            let used = budget.entry(card).or_insert(0);
            if *used < entry.owned(card) {
                *used += 1;
                true
            } else {
                false
            }
        })
        .cloned()
        .collect()
}

/// Trade engine over the ledger and session documents
pub struct TradeEngine {
    ledger: LedgerStore,
    sessions: SessionStore,
    locks: Arc<LockTable>,
}

impl TradeEngine {
    pub fn new(ledger: LedgerStore, sessions: SessionStore, locks: Arc<LockTable>) -> Self {
        TradeEngine {
            ledger,
            sessions,
            locks,
        }
    }

    /// Open a session between two distinct, known players
    ///
    /// The opener becomes the initiator and starts in the first picking
    /// stage. The partner needs to do nothing until the decision stage.
    pub fn open_session(
        &self,
        initiator_id: &str,
        partner_id: &str,
    ) -> Result<TradeSession, EconomyError> {
        if initiator_id.is_empty() || partner_id.is_empty() {
            return Err(EconomyError::MissingIdentity);
        }
        if initiator_id == partner_id {
            return Err(EconomyError::SelfTrade);
        }

        let ledger = self.ledger.load_all()?;
        for id in [initiator_id, partner_id] {
            if !ledger.contains_key(id) {
                return Err(EconomyError::player_not_found(id));
            }
        }

        let session = TradeSession::new(SessionStore::next_session_id(), initiator_id, partner_id);

        let doc = self.locks.document(TRADE_SESSIONS_KEY);
        let _doc_guard = doc.lock();
        let mut sessions = self.sessions.load_all()?;
        sessions.insert(session.session_id.clone(), session.clone());
        self.sessions.save_all(&sessions)?;

        tracing::info!(
            session_id = %session.session_id,
            initiator = initiator_id,
            partner = partner_id,
            "trade session opened"
        );
        Ok(session)
    }

    /// Current state of a session
    pub fn state(&self, session_id: &str) -> Result<TradeSession, EconomyError> {
        self.sessions
            .get(session_id)?
            .ok_or_else(|| EconomyError::session_not_found(session_id))
    }

    /// Record the initiator's selection for the session's current stage
    ///
    /// The `stage` argument is the stage the caller believes the session is
    /// in. A mismatch means the caller acted on a stale view and is rejected
    /// rather than guessed at. Only the initiator selects, in either stage.
    pub fn select(
        &self,
        session_id: &str,
        caller_id: &str,
        stage: TradeStage,
        cards: &[CardId],
    ) -> Result<TradeSession, EconomyError> {
        if caller_id.is_empty() {
            return Err(EconomyError::MissingIdentity);
        }

        let session_key = self.locks.session(session_id);
        let _session_guard = session_key.lock();
        // The session document is re-saved below; its lock keeps concurrent
        // writers for other sessions from clobbering this save.
        let doc = self.locks.document(TRADE_SESSIONS_KEY);
        let _doc_guard = doc.lock();

        let mut sessions = self.sessions.load_all()?;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| EconomyError::session_not_found(session_id))?;

        let role = session
            .role_of(caller_id)
            .ok_or_else(|| EconomyError::not_participant(caller_id, session_id))?;

        let next_stage = match session.stage.after_selection() {
            Some(next) if stage == session.stage => next,
            _ => return Err(EconomyError::invalid_stage("select", session.stage)),
        };
        if role != TradeRole::Initiator {
            return Err(EconomyError::invalid_stage("select", session.stage));
        }
        if cards.len() > SELECTION_LIMIT {
            return Err(EconomyError::selection_too_large(cards.len(), SELECTION_LIMIT));
        }

        // The selection must be covered by the collection it draws from: the
        // initiator's own in the first stage, the partner's in the second.
        let ledger = self.ledger.load_all()?;
        let owner_id = match session.stage {
            TradeStage::PickMine => &session.initiator.player_id,
            _ => &session.partner.player_id,
        };
        if !selection_is_owned(ledger.get(owner_id.as_str()), cards) {
            return Err(EconomyError::NoOwnership);
        }

        match session.stage {
            TradeStage::PickMine => session.initiator.selection = cards.to_vec(),
            _ => session.partner.selection = cards.to_vec(),
        }
        session.stage = next_stage;

        let updated = session.clone();
        self.sessions.save_all(&sessions)?;

        tracing::info!(
            session_id,
            caller = caller_id,
            cards = cards.len(),
            stage = %updated.stage,
            "trade selection recorded"
        );
        Ok(updated)
    }

    /// Apply the partner's binding verdict on a session in the decision stage
    ///
    /// Deny finalizes without touching the ledger. Accept re-validates both
    /// selections against current ownership, clamps away anything no longer
    /// held, and applies the four-way swap as one ledger write.
    pub fn decide(
        &self,
        session_id: &str,
        caller_id: &str,
        decision: TradeDecision,
    ) -> Result<TradeSession, EconomyError> {
        if caller_id.is_empty() {
            return Err(EconomyError::MissingIdentity);
        }

        let session_key = self.locks.session(session_id);
        let _session_guard = session_key.lock();
        // The session document is re-saved below; its lock keeps concurrent
        // writers for other sessions from clobbering this save.
        let doc = self.locks.document(TRADE_SESSIONS_KEY);
        let _doc_guard = doc.lock();

        let mut sessions = self.sessions.load_all()?;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| EconomyError::session_not_found(session_id))?;

        let role = session
            .role_of(caller_id)
            .ok_or_else(|| EconomyError::not_participant(caller_id, session_id))?;
        if session.stage != TradeStage::Decision {
            return Err(EconomyError::invalid_stage("decide", session.stage));
        }
        // The verdict belongs to the partner alone
        if role != TradeRole::Partner {
            return Err(EconomyError::invalid_stage("decide", session.stage));
        }

        if decision == TradeDecision::Deny {
            session.stage = TradeStage::Denied;
            let updated = session.clone();
            self.sessions.save_all(&sessions)?;
            tracing::info!(session_id, "trade denied");
            return Ok(updated);
        }

        // Session lock first, then both player locks in canonical order
        let initiator_id = session.initiator.player_id.clone();
        let partner_id = session.partner.player_id.clone();
        let (first, second) = self.locks.player_pair(&initiator_id, &partner_id);
        let _first_guard = first.lock();
        let _second_guard = second.as_ref().map(|k| k.lock());
        // The whole ledger document is rewritten by the swap; its lock keeps
        // a concurrent third-party sell from being overwritten.
        let ledger_doc = self.locks.document(PLAYER_LEDGER_KEY);
        let _ledger_doc_guard = ledger_doc.lock();

        let mut ledger = self.ledger.load_all()?;
        let initiator_entry = ledger
            .get(&initiator_id)
            .cloned()
            .ok_or_else(|| EconomyError::player_not_found(&initiator_id))?;
        let partner_entry = ledger
            .get(&partner_id)
            .cloned()
            .ok_or_else(|| EconomyError::player_not_found(&partner_id))?;

        let give = clamp_selection(&initiator_entry, &session.initiator.selection);
        let take = clamp_selection(&partner_entry, &session.partner.selection);

        let mut initiator_after = initiator_entry;
        let mut partner_after = partner_entry;
        for card in &give {
            initiator_after.remove_cards(card, 1);
            partner_after.add_cards(card, 1);
        }
        for card in &take {
            partner_after.remove_cards(card, 1);
            initiator_after.add_cards(card, 1);
        }
        ledger.insert(initiator_id.clone(), initiator_after);
        ledger.insert(partner_id.clone(), partner_after);

        session.initiator.selection = give;
        session.partner.selection = take;
        session.stage = TradeStage::Accepted;
        let updated = session.clone();

        self.ledger.save_all(&ledger)?;
        if let Err(e) = self.sessions.save_all(&sessions) {
            tracing::error!(
                session_id,
                error = %e,
                "swap applied but session finalize failed"
            );
            return Err(e);
        }

        tracing::info!(
            session_id,
            gave = updated.initiator.selection.len(),
            took = updated.partner.selection.len(),
            "trade accepted"
        );
        Ok(updated)
    }
}
