//! Card master index
//!
//! The catalog is a static, versioned table of card metadata: id, rarity,
//! display name, asset reference. It is loaded once at process start from
//! the blob store (key `card_master`), cached in memory, and never mutated
//! at runtime.
//!
//! Absence of the table is tolerated in two different ways: pricing fails
//! open (every card prices as Common), while metadata consumers see an empty
//! catalog and must handle not-found themselves. The sell engine never needs
//! display metadata, so it is unaffected by catalog absence.

use crate::storage::BlobStore;
use crate::types::{CardId, CardMasterRecord, EconomyError, Rarity};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub mod pricing;

pub use pricing::unit_price;

/// Storage key the master table lives under
pub const CARD_MASTER_KEY: &str = "card_master";

/// Raw card row as it appears in the master table
///
/// The table has grown organically: rows may carry `id` or `number`, rarity
/// is free-form text, and the asset reference goes by several names. All of
/// that is normalized into [`CardMasterRecord`] at load time.
#[derive(Debug, Deserialize)]
struct RawCardRow {
    id: Option<Value>,
    number: Option<Value>,
    rarity: Option<String>,
    name: Option<String>,
    #[serde(alias = "image", alias = "image_url", alias = "asset")]
    asset_ref: Option<String>,
}

impl RawCardRow {
    fn normalize(self) -> Option<CardMasterRecord> {
        let raw_id = self.id.or(self.number)?;
        let card_id = match raw_id {
            Value::Number(n) => CardId::from_number(n.as_u64()?),
            Value::String(s) => CardId::new(s),
            _ => return None,
        };
        Some(CardMasterRecord {
            card_id,
            rarity: self.rarity.as_deref().and_then(Rarity::parse_loose),
            name: self.name.unwrap_or_default(),
            asset_ref: self.asset_ref,
        })
    }
}

/// In-memory cache of the card master table
///
/// Read-through cache with a load-once-at-startup lifecycle; no hidden
/// mutation elsewhere.
#[derive(Debug, Default)]
pub struct CardCatalog {
    cards: HashMap<CardId, CardMasterRecord>,
}

impl CardCatalog {
    /// An empty catalog (the fail-open stand-in when the table is missing)
    pub fn empty() -> Self {
        CardCatalog::default()
    }

    /// Build a catalog from already-normalized records
    pub fn from_records(records: impl IntoIterator<Item = CardMasterRecord>) -> Self {
        let cards = records
            .into_iter()
            .map(|r| (r.card_id.clone(), r))
            .collect();
        CardCatalog { cards }
    }

    /// Load the master table from the blob store
    ///
    /// Accepts both table shapes seen in the wild: a bare array of rows, or
    /// an object with a `cards` array. A missing blob yields an empty
    /// catalog; a present-but-undecodable blob is a storage error.
    pub fn load(store: &dyn BlobStore) -> Result<Self, EconomyError> {
        let Some(value) = store.load(CARD_MASTER_KEY)? else {
            tracing::warn!("card master table absent; pricing falls open to the common rate");
            return Ok(CardCatalog::empty());
        };

        let rows: Vec<RawCardRow> = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            Value::Object(mut obj) => match obj.remove("cards") {
                Some(cards) => serde_json::from_value(cards)?,
                None => Vec::new(),
            },
            _ => Vec::new(),
        };

        let catalog = CardCatalog::from_records(rows.into_iter().filter_map(RawCardRow::normalize));
        tracing::info!(cards = catalog.len(), "card master table loaded");
        Ok(catalog)
    }

    /// Look up a card's master record
    pub fn lookup(&self, card_id: &CardId) -> Option<&CardMasterRecord> {
        self.cards.get(card_id)
    }

    /// Unit sell price for a card
    ///
    /// Unknown cards and unrecognized rarities take the Common price; this
    /// fail-open policy means pricing never blocks a sell.
    pub fn price_of(&self, card_id: &CardId) -> rust_decimal::Decimal {
        unit_price(self.lookup(card_id).and_then(|r| r.rarity))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
