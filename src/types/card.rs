//! Card identity and master-catalog types
//!
//! Card ids are 3-digit zero-padded strings ("001", "042"). Client payloads
//! may carry them as strings or bare integers; both normalize to the padded
//! form so that ownership maps and catalog lookups agree on one key shape.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Normalized card identifier
///
/// Always stored in the 3-digit zero-padded form. Purely numeric inputs are
/// padded ("7" -> "007"); non-numeric inputs are kept verbatim so that an
/// unknown id still round-trips through error messages and responses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Normalize a raw id string into a CardId
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            CardId(format!("{:0>3}", trimmed))
        } else {
            CardId(trimmed.to_string())
        }
    }

    /// Build a CardId from a bare card number
    pub fn from_number(n: u64) -> Self {
        CardId(format!("{:03}", n))
    }

    /// The normalized id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CardId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => CardId::from_number(n),
            Raw::Text(s) => CardId::new(s),
        })
    }
}

/// Card rarity tiers
///
/// The catalog carries rarity as free-form text, so parsing is deliberately
/// loose: case-insensitive substring matching, with the longer keywords
/// checked first so that "Uncommon" never reads as "Common".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
    Unique,
}

impl Rarity {
    /// Parse a free-form rarity string from the card master table
    ///
    /// Returns `None` for empty or unrecognized values; callers treat that
    /// as the fail-open pricing case.
    pub fn parse_loose(raw: &str) -> Option<Rarity> {
        let r = raw.to_lowercase();
        if r.contains("legendary") {
            Some(Rarity::Legendary)
        } else if r.contains("unique") {
            Some(Rarity::Unique)
        } else if r.contains("uncommon") {
            Some(Rarity::Uncommon)
        } else if r.contains("rare") {
            Some(Rarity::Rare)
        } else if r.contains("common") {
            Some(Rarity::Common)
        } else {
            None
        }
    }
}

/// One immutable row of the card master table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMasterRecord {
    /// Normalized 3-digit card id
    pub card_id: CardId,

    /// Rarity tier, if the table carried a recognizable one
    pub rarity: Option<Rarity>,

    /// Display name
    pub name: String,

    /// Opaque asset reference (image path or URL); presentation-only
    pub asset_ref: Option<String>,
}
