//! End-to-end integration tests
//!
//! These tests exercise the full economy stack the way the service binary
//! wires it: file-backed blob storage in a temporary directory, the card
//! catalog loaded from the store, and the sell and trade engines sharing one
//! ledger document. They cover:
//!
//! - Sell execution with rarity pricing, ownership clamping, and quota gating
//! - Quota persistence across engine restarts (same data directory)
//! - The full trade lifecycle, including denial and stale-selection clamping
//! - Layered storage fallback when the primary provider fails
//! - Concurrent sells against one player staying within the daily limit

use card_economy_engine::core::{
    LedgerStore, LockTable, QuotaStore, SellEngine, SellItem, SessionStore, TradeEngine,
};
use card_economy_engine::storage::{BlobStore, FileStore, LayeredStore, MemoryStore};
use card_economy_engine::types::{
    CardId, EconomyError, PlayerLedgerEntry, TradeDecision, TradeStage,
};
use card_economy_engine::{catalog::CARD_MASTER_KEY, CardCatalog};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

/// The two engines plus direct store handles for seeding and inspection
struct Stack {
    sell: SellEngine,
    trade: TradeEngine,
    ledger: LedgerStore,
}

/// Seed a card master table and build the full stack over the given store
fn build_stack(store: Arc<dyn BlobStore>, daily_limit: u32) -> Stack {
    store
        .save(
            CARD_MASTER_KEY,
            &json!([
                {"id": "001", "rarity": "Rare", "name": "Scout"},
                {"id": "002", "rarity": "Common", "name": "Grunt"},
                {"id": "003", "rarity": "Legendary", "name": "Warlord"},
                {"id": "004", "rarity": "Uncommon", "name": "Archer"}
            ]),
        )
        .unwrap();

    let catalog = Arc::new(CardCatalog::load(store.as_ref()).unwrap());
    let ledger = LedgerStore::new(store.clone());
    let quota = QuotaStore::new(store.clone());
    let sessions = SessionStore::new(store.clone());
    let locks = Arc::new(LockTable::new());

    Stack {
        sell: SellEngine::new(
            catalog,
            ledger.clone(),
            quota,
            locks.clone(),
            daily_limit,
        ),
        trade: TradeEngine::new(ledger.clone(), sessions, locks),
        ledger,
    }
}

fn file_stack(dir: &TempDir, daily_limit: u32) -> Stack {
    build_stack(Arc::new(FileStore::new(dir.path())), daily_limit)
}

fn seed_player(ledger: &LedgerStore, player_id: &str, cards: &[(&str, u32)]) {
    let mut entry = PlayerLedgerEntry::new(player_id);
    for (id, count) in cards {
        entry.add_cards(&CardId::new(*id), *count);
    }
    ledger.upsert(entry).unwrap();
}

fn items(lines: &[(&str, i64)]) -> Vec<SellItem> {
    lines
        .iter()
        .map(|(id, qty)| SellItem {
            card_id: CardId::new(*id),
            qty: *qty,
        })
        .collect()
}

fn owned(ledger: &LedgerStore, player_id: &str, card: &str) -> u32 {
    ledger
        .get(player_id)
        .unwrap()
        .unwrap()
        .owned(&CardId::new(card))
}

#[test]
fn test_sell_prices_clamp_and_persist_on_disk() {
    let dir = TempDir::new().unwrap();
    let stack = file_stack(&dir, 5);
    seed_player(&stack.ledger, "alice", &[("001", 2), ("002", 1)]);

    let outcome = stack
        .sell
        .execute_sell("alice", &items(&[("001", 2), ("002", 1)]))
        .unwrap();
    assert_eq!(outcome.credited, Decimal::new(450, 2));
    assert_eq!(outcome.sold_count, 3);

    // Rebuild the stack over the same directory: everything survived
    let reopened = file_stack(&dir, 5);
    let entry = reopened.ledger.get("alice").unwrap().unwrap();
    assert_eq!(entry.balance, Decimal::new(450, 2));
    assert_eq!(entry.owned(&CardId::new("001")), 0);

    let status = reopened.sell.sell_status("alice").unwrap();
    assert_eq!(status.sold_today, 3);
    assert_eq!(status.remaining, 2);
}

#[test]
fn test_quota_gate_spans_multiple_requests() {
    let dir = TempDir::new().unwrap();
    let stack = file_stack(&dir, 5);
    seed_player(&stack.ledger, "alice", &[("002", 10)]);

    stack
        .sell
        .execute_sell("alice", &items(&[("002", 4)]))
        .unwrap();

    // 4 of 5 used; a request for 2 more is rejected outright
    let err = stack
        .sell
        .execute_sell("alice", &items(&[("002", 2)]))
        .unwrap_err();
    assert_eq!(err, EconomyError::daily_limit_reached(2, 1));

    // The last unit still goes through
    let outcome = stack
        .sell
        .execute_sell("alice", &items(&[("002", 1)]))
        .unwrap();
    assert_eq!(outcome.sold_count, 1);
    assert_eq!(stack.sell.sell_status("alice").unwrap().remaining, 0);
}

#[test]
fn test_quotas_are_per_player() {
    let dir = TempDir::new().unwrap();
    let stack = file_stack(&dir, 5);
    seed_player(&stack.ledger, "alice", &[("002", 10)]);
    seed_player(&stack.ledger, "bob", &[("002", 10)]);

    stack
        .sell
        .execute_sell("alice", &items(&[("002", 5)]))
        .unwrap();

    // Alice exhausted her quota; Bob's is untouched
    assert_eq!(stack.sell.sell_status("alice").unwrap().remaining, 0);
    assert_eq!(stack.sell.sell_status("bob").unwrap().remaining, 5);
    assert!(stack.sell.execute_sell("bob", &items(&[("002", 5)])).is_ok());
}

#[test]
fn test_preview_agrees_with_execution() {
    let dir = TempDir::new().unwrap();
    let stack = file_stack(&dir, 10);
    seed_player(&stack.ledger, "alice", &[("003", 1), ("004", 2)]);

    let basket = items(&[("003", 1), ("004", 2)]);
    let previewed = stack.sell.preview_sell(&basket).unwrap();
    let executed = stack.sell.execute_sell("alice", &basket).unwrap();

    // Fully-owned basket: preview equals execution credit
    assert_eq!(previewed, executed.credited);
    assert_eq!(previewed, Decimal::new(500, 2));
}

#[test]
fn test_full_trade_lifecycle_on_disk() {
    let dir = TempDir::new().unwrap();
    let stack = file_stack(&dir, 5);
    seed_player(&stack.ledger, "alice", &[("001", 2)]);
    seed_player(&stack.ledger, "bob", &[("003", 1)]);

    let session = stack.trade.open_session("alice", "bob").unwrap();
    let id = session.session_id.clone();

    stack
        .trade
        .select(&id, "alice", TradeStage::PickMine, &[CardId::new("001")])
        .unwrap();
    stack
        .trade
        .select(&id, "alice", TradeStage::PickTheirs, &[CardId::new("003")])
        .unwrap();
    let done = stack.trade.decide(&id, "bob", TradeDecision::Accept).unwrap();
    assert_eq!(done.stage, TradeStage::Accepted);

    assert_eq!(owned(&stack.ledger, "alice", "001"), 1);
    assert_eq!(owned(&stack.ledger, "alice", "003"), 1);
    assert_eq!(owned(&stack.ledger, "bob", "001"), 1);
    assert_eq!(owned(&stack.ledger, "bob", "003"), 0);

    // The terminal session is still readable after a restart
    let reopened = file_stack(&dir, 5);
    assert_eq!(reopened.trade.state(&id).unwrap().stage, TradeStage::Accepted);
}

#[test]
fn test_denied_trade_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let stack = file_stack(&dir, 5);
    seed_player(&stack.ledger, "alice", &[("001", 1)]);
    seed_player(&stack.ledger, "bob", &[("003", 1)]);

    let id = stack
        .trade
        .open_session("alice", "bob")
        .unwrap()
        .session_id;
    stack
        .trade
        .select(&id, "alice", TradeStage::PickMine, &[CardId::new("001")])
        .unwrap();
    stack
        .trade
        .select(&id, "alice", TradeStage::PickTheirs, &[CardId::new("003")])
        .unwrap();
    stack.trade.decide(&id, "bob", TradeDecision::Deny).unwrap();

    assert_eq!(owned(&stack.ledger, "alice", "001"), 1);
    assert_eq!(owned(&stack.ledger, "bob", "003"), 1);
}

#[test]
fn test_selling_a_selected_card_clamps_the_later_accept() {
    let dir = TempDir::new().unwrap();
    let stack = file_stack(&dir, 5);
    seed_player(&stack.ledger, "alice", &[("001", 1), ("002", 1)]);
    seed_player(&stack.ledger, "bob", &[("003", 1)]);

    let id = stack
        .trade
        .open_session("alice", "bob")
        .unwrap()
        .session_id;
    stack
        .trade
        .select(
            &id,
            "alice",
            TradeStage::PickMine,
            &[CardId::new("001"), CardId::new("002")],
        )
        .unwrap();
    stack
        .trade
        .select(&id, "alice", TradeStage::PickTheirs, &[CardId::new("003")])
        .unwrap();

    // Alice sells her selected 001 while the partner deliberates
    stack
        .sell
        .execute_sell("alice", &items(&[("001", 1)]))
        .unwrap();

    let done = stack.trade.decide(&id, "bob", TradeDecision::Accept).unwrap();
    // The sold card dropped out of the swap; the rest went through
    assert_eq!(done.initiator.selection, vec![CardId::new("002")]);
    assert_eq!(owned(&stack.ledger, "bob", "001"), 0);
    assert_eq!(owned(&stack.ledger, "bob", "002"), 1);
    assert_eq!(owned(&stack.ledger, "alice", "003"), 1);
}

#[test]
fn test_trade_and_sell_share_one_ledger() {
    let dir = TempDir::new().unwrap();
    let stack = file_stack(&dir, 5);
    seed_player(&stack.ledger, "alice", &[("001", 1)]);
    seed_player(&stack.ledger, "bob", &[("003", 1)]);

    let id = stack
        .trade
        .open_session("alice", "bob")
        .unwrap()
        .session_id;
    stack
        .trade
        .select(&id, "alice", TradeStage::PickMine, &[])
        .unwrap();
    stack
        .trade
        .select(&id, "alice", TradeStage::PickTheirs, &[CardId::new("003")])
        .unwrap();
    stack.trade.decide(&id, "bob", TradeDecision::Accept).unwrap();

    // Alice can immediately sell the card the trade just gave her
    let outcome = stack
        .sell
        .execute_sell("alice", &items(&[("003", 1)]))
        .unwrap();
    assert_eq!(outcome.credited, Decimal::new(300, 2));
}

#[test]
fn test_layered_storage_survives_primary_failure() {
    let primary = Arc::new(MemoryStore::new());
    let mirror = Arc::new(MemoryStore::new());
    let layered: Arc<dyn BlobStore> =
        Arc::new(LayeredStore::new(vec![primary.clone(), mirror.clone()]));

    let stack = build_stack(layered, 5);
    seed_player(&stack.ledger, "alice", &[("001", 2)]);

    // Primary goes dark; reads and writes fall through to the mirror
    primary.set_failing(true);
    let outcome = stack
        .sell
        .execute_sell("alice", &items(&[("001", 1)]))
        .unwrap();
    assert_eq!(outcome.credited, Decimal::new(200, 2));
    assert_eq!(owned(&stack.ledger, "alice", "001"), 1);
}

#[test]
fn test_concurrent_sellers_on_distinct_players_do_not_interfere() {
    use std::thread;

    let stack = Arc::new(build_stack(Arc::new(MemoryStore::new()), 5));
    for player in ["p0", "p1", "p2", "p3"] {
        seed_player(&stack.ledger, player, &[("002", 10)]);
    }

    let mut handles = vec![];
    for player in ["p0", "p1", "p2", "p3"] {
        let stack = Arc::clone(&stack);
        handles.push(thread::spawn(move || {
            for _ in 0..5 {
                stack
                    .sell
                    .execute_sell(player, &items(&[("002", 1)]))
                    .unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // Every player landed exactly on the limit, independently
    for player in ["p0", "p1", "p2", "p3"] {
        let status = stack.sell.sell_status(player).unwrap();
        assert_eq!(status.sold_today, 5);
        let entry = stack.ledger.get(player).unwrap().unwrap();
        assert_eq!(entry.balance, Decimal::new(250, 2));
    }
}

#[test]
fn test_third_party_sells_survive_a_concurrent_trade_accept() {
    use std::thread;

    let stack = Arc::new(build_stack(Arc::new(MemoryStore::new()), 100));
    seed_player(&stack.ledger, "alice", &[("001", 1)]);
    seed_player(&stack.ledger, "bob", &[("003", 1)]);
    seed_player(&stack.ledger, "carol", &[("002", 50)]);

    let id = stack
        .trade
        .open_session("alice", "bob")
        .unwrap()
        .session_id;
    stack
        .trade
        .select(&id, "alice", TradeStage::PickMine, &[CardId::new("001")])
        .unwrap();
    stack
        .trade
        .select(&id, "alice", TradeStage::PickTheirs, &[CardId::new("003")])
        .unwrap();

    // Carol, uninvolved in the trade, sells while the swap lands
    let seller = {
        let stack = Arc::clone(&stack);
        thread::spawn(move || {
            for _ in 0..20 {
                stack
                    .sell
                    .execute_sell("carol", &items(&[("002", 1)]))
                    .unwrap();
            }
        })
    };
    let decider = {
        let stack = Arc::clone(&stack);
        let id = id.clone();
        thread::spawn(move || stack.trade.decide(&id, "bob", TradeDecision::Accept))
    };

    seller.join().unwrap();
    decider.join().unwrap().unwrap();

    // Every one of carol's acknowledged sells survived the swap's save
    let carol = stack.ledger.get("carol").unwrap().unwrap();
    assert_eq!(carol.balance, Decimal::new(1000, 2));
    assert_eq!(carol.owned(&CardId::new("002")), 30);
    // And the swap itself landed
    assert_eq!(owned(&stack.ledger, "alice", "003"), 1);
    assert_eq!(owned(&stack.ledger, "bob", "001"), 1);
}

#[test]
fn test_concurrent_trades_and_sells_conserve_cards() {
    use std::thread;

    let stack = Arc::new(build_stack(Arc::new(MemoryStore::new()), 100));
    seed_player(&stack.ledger, "alice", &[("001", 5), ("002", 20)]);
    seed_player(&stack.ledger, "bob", &[("003", 5)]);

    let id = stack
        .trade
        .open_session("alice", "bob")
        .unwrap()
        .session_id;
    stack
        .trade
        .select(&id, "alice", TradeStage::PickMine, &[CardId::new("001")])
        .unwrap();
    stack
        .trade
        .select(&id, "alice", TradeStage::PickTheirs, &[CardId::new("003")])
        .unwrap();

    // Partner accepts while the initiator hammers the sell endpoint with a
    // card that is not part of the trade
    let seller = {
        let stack = Arc::clone(&stack);
        thread::spawn(move || {
            for _ in 0..10 {
                let _ = stack.sell.execute_sell("alice", &items(&[("002", 1)]));
            }
        })
    };
    let decider = {
        let stack = Arc::clone(&stack);
        let id = id.clone();
        thread::spawn(move || stack.trade.decide(&id, "bob", TradeDecision::Accept))
    };

    seller.join().unwrap();
    decider.join().unwrap().unwrap();

    // Card 001 and 003 totals are conserved across the swap
    assert_eq!(
        owned(&stack.ledger, "alice", "001") + owned(&stack.ledger, "bob", "001"),
        5
    );
    assert_eq!(
        owned(&stack.ledger, "alice", "003") + owned(&stack.ledger, "bob", "003"),
        5
    );
    // The ten unrelated sells all landed
    assert_eq!(owned(&stack.ledger, "alice", "002"), 10);
}
