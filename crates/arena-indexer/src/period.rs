//! Partitioning an event sequence into pricing periods.
//!
//! Table position is the only ordering the arena page guarantees: row 0 is
//! the newest event, and a game can share its date with a price update. The
//! assigner therefore walks rows by `row_index` (backwards in time) and cuts
//! a new period at every price-change row. Dates are never consulted.
//!
//! The newest period has no price update above it and carries
//! [`PeriodPrices::Current`]. Every other period carries the prices listed on
//! the price-change row directly above it.

use crate::error::IndexerError;
use arena_types::{ArenaEvent, EventSequence, PeriodBoundary, PeriodPrices, PricingPeriod};
use std::collections::HashMap;

/// Splits an [`EventSequence`] into [`PricingPeriod`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct PeriodAssigner;

impl PeriodAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Assign every game event to exactly one period.
    ///
    /// Periods come back newest first and cover contiguous, non-overlapping
    /// row ranges. Periods without games are kept.
    ///
    /// # Errors
    ///
    /// [`IndexerError::DuplicateGameAssignment`] if a game id appears on two
    /// rows.
    pub fn assign(&self, events: &EventSequence) -> Result<Vec<PricingPeriod>, IndexerError> {
        let mut periods = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut open = OpenPeriod::new(0, 0, PeriodPrices::Current, None);

        for event in events {
            match event {
                ArenaEvent::Game(game) => match &game.game_id {
                    Some(id) => {
                        if let Some(first_row) = seen.insert(id.as_str(), game.row_index) {
                            return Err(IndexerError::DuplicateGameAssignment {
                                game_id: id.clone(),
                                first_row,
                                second_row: game.row_index,
                            });
                        }
                        open.member_game_ids.push(id.clone());
                    }
                    None => open.unidentified_game_rows.push(game.row_index),
                },
                ArenaEvent::PriceChange(change) => {
                    let boundary = PeriodBoundary::from(change);
                    let next = OpenPeriod::new(
                        open.period_index + 1,
                        change.row_index + 1,
                        PeriodPrices::Snapshot(change.prices.clone()),
                        Some(boundary.clone()),
                    );
                    let closed = std::mem::replace(&mut open, next);
                    periods.push(closed.close(change.row_index, Some(boundary)));
                }
            }
        }

        periods.push(open.close(events.row_count(), None));

        tracing::debug!(
            "assigned {} games to {} periods",
            seen.len(),
            periods.len()
        );
        Ok(periods)
    }
}

struct OpenPeriod {
    period_index: usize,
    start: usize,
    prices: PeriodPrices,
    opened_by: Option<PeriodBoundary>,
    member_game_ids: Vec<String>,
    unidentified_game_rows: Vec<usize>,
}

impl OpenPeriod {
    fn new(period_index: usize, start: usize, prices: PeriodPrices, opened_by: Option<PeriodBoundary>) -> Self {
        Self {
            period_index,
            start,
            prices,
            opened_by,
            member_game_ids: Vec::new(),
            unidentified_game_rows: Vec::new(),
        }
    }

    fn close(self, end: usize, closed_by: Option<PeriodBoundary>) -> PricingPeriod {
        PricingPeriod {
            period_index: self.period_index,
            boundary_start_index: self.start,
            boundary_end_index: end,
            prices: self.prices,
            opened_by: self.opened_by,
            closed_by,
            member_game_ids: self.member_game_ids,
            unidentified_game_rows: self.unidentified_game_rows,
        }
    }
}
