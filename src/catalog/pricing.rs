//! Rarity-to-price table
//!
//! The sell price curve is fixed: Legendary 3.00, Rare 2.00, Uncommon 1.00,
//! Common 0.50. Unique cards carry no listed price and take the fail-open
//! Common rate, as does any card whose rarity is missing or unrecognized.

use crate::types::Rarity;
use rust_decimal::Decimal;

/// Unit sell price for a rarity tier
pub fn unit_price(rarity: Option<Rarity>) -> Decimal {
    match rarity {
        Some(Rarity::Legendary) => Decimal::new(300, 2),
        Some(Rarity::Rare) => Decimal::new(200, 2),
        Some(Rarity::Uncommon) => Decimal::new(100, 2),
        // Fail-open default: Common, Unique, and anything unrecognized
        Some(Rarity::Common) | Some(Rarity::Unique) | None => Decimal::new(50, 2),
    }
}
