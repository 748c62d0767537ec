//! Ticket price snapshots.
//!
//! A [`PriceSnapshot`] holds one price per seat category. Any of them may be
//! absent when the source cell could not be read, which is different from a
//! price of zero.

use crate::SeatCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ticket prices for all four seat categories at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub bleachers: Option<Decimal>,
    pub lower_tier: Option<Decimal>,
    pub courtside: Option<Decimal>,
    pub luxury_boxes: Option<Decimal>,
}

impl PriceSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from prices in table column order.
    pub fn from_columns(prices: [Option<Decimal>; 4]) -> Self {
        let [bleachers, lower_tier, courtside, luxury_boxes] = prices;
        Self {
            bleachers,
            lower_tier,
            courtside,
            luxury_boxes,
        }
    }

    /// Set the price for one category (builder pattern).
    pub fn with_price(mut self, seat: SeatCategory, price: Decimal) -> Self {
        *self.slot_mut(seat) = Some(price);
        self
    }

    /// Price for a seat category, if known.
    pub fn get(&self, seat: SeatCategory) -> Option<Decimal> {
        match seat {
            SeatCategory::Bleachers => self.bleachers,
            SeatCategory::LowerTier => self.lower_tier,
            SeatCategory::Courtside => self.courtside,
            SeatCategory::LuxuryBoxes => self.luxury_boxes,
        }
    }

    fn slot_mut(&mut self, seat: SeatCategory) -> &mut Option<Decimal> {
        match seat {
            SeatCategory::Bleachers => &mut self.bleachers,
            SeatCategory::LowerTier => &mut self.lower_tier,
            SeatCategory::Courtside => &mut self.courtside,
            SeatCategory::LuxuryBoxes => &mut self.luxury_boxes,
        }
    }

    /// True if no category has a price.
    pub fn is_empty(&self) -> bool {
        SeatCategory::ALL.iter().all(|s| self.get(*s).is_none())
    }

    /// True if every category has a price.
    pub fn is_complete(&self) -> bool {
        SeatCategory::ALL.iter().all(|s| self.get(*s).is_some())
    }
}

/// Prices that apply to a pricing period.
///
/// The newest period on the page has no price-change row above it, so its
/// prices are whatever the arena charges today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "prices", rename_all = "snake_case")]
pub enum PeriodPrices {
    /// Prices currently in effect; resolved from the store at write time.
    Current,

    /// Prices carried by a price-change row.
    Snapshot(PriceSnapshot),
}

impl PeriodPrices {
    /// The explicit snapshot, if this is not the current period.
    pub fn snapshot(&self) -> Option<&PriceSnapshot> {
        match self {
            PeriodPrices::Current => None,
            PeriodPrices::Snapshot(s) => Some(s),
        }
    }

    #[inline]
    pub fn is_current(&self) -> bool {
        matches!(self, PeriodPrices::Current)
    }
}
