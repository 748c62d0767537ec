//! Pricing periods derived from an event sequence.

use crate::{PeriodPrices, PriceChange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A price-change row bounding a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBoundary {
    pub row_index: usize,
    pub date_raw: String,
    pub date_parsed: Option<NaiveDate>,
}

impl From<&PriceChange> for PeriodBoundary {
    fn from(change: &PriceChange) -> Self {
        Self {
            row_index: change.row_index,
            date_raw: change.date_raw.clone(),
            date_parsed: change.date_parsed,
        }
    }
}

/// A contiguous run of table rows sharing one set of ticket prices.
///
/// The row range is half-open: `boundary_start_index..boundary_end_index`.
/// A period opened by a price change starts right after that row, so the
/// price-change rows themselves belong to no period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPeriod {
    /// Position of the period, 0 being the newest.
    pub period_index: usize,

    pub boundary_start_index: usize,
    pub boundary_end_index: usize,

    pub prices: PeriodPrices,

    /// Newer price change directly above the period. `None` for the newest
    /// period.
    pub opened_by: Option<PeriodBoundary>,

    /// Older price change directly below the period. `None` for the oldest.
    pub closed_by: Option<PeriodBoundary>,

    /// Identified games in the period, in table order.
    pub member_game_ids: Vec<String>,

    /// Rows of game events in the period that carried no identifier.
    pub unidentified_game_rows: Vec<usize>,
}

impl PricingPeriod {
    #[inline]
    pub fn row_range(&self) -> Range<usize> {
        self.boundary_start_index..self.boundary_end_index
    }

    #[inline]
    pub fn contains_row(&self, row_index: usize) -> bool {
        self.row_range().contains(&row_index)
    }

    /// True if the period holds no game rows at all.
    pub fn is_empty(&self) -> bool {
        self.member_game_ids.is_empty() && self.unidentified_game_rows.is_empty()
    }
}
