//! Pricing stored home games that the attendance table does not list.
//!
//! The table only lists some games (friendlies and some cup games are
//! missing), but those games were still played under one of the periods'
//! prices. Once the venue offset is known, each period gets a UTC window in
//! which any home game must have been played under that period's prices:
//!
//! - lower edge: end of the local day of the older bounding price change,
//!   or the earliest listed game of the period when there is none
//! - upper edge: start of the local day of the newer bounding price change,
//!   or the latest listed game of the period when there is none
//!
//! The days of the price changes themselves are excluded, since a game on
//! that day may have been played before or after the update. When several
//! offsets fit the matched games equally well, the excluded day is widened
//! to cover that day under every one of them.

use crate::timezone::{local_day_end, local_day_start};
use arena_types::{GameRecord, PricingPeriod};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// UTC interval in which a period's prices certainly applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeWindow {
    pub period_index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SafeWindow {
    /// Strictly inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start < instant && instant < self.end
    }
}

/// Build the safe window of every period that has one.
///
/// `records` maps game id to stored record and supplies start times of the
/// listed games. `offset_range` holds the lowest and highest plausible venue
/// offsets in minutes.
pub fn safe_windows(
    periods: &[PricingPeriod],
    records: &HashMap<&str, &GameRecord>,
    offset_range: (i32, i32),
) -> Vec<SafeWindow> {
    let (min_offset, max_offset) = offset_range;
    periods
        .iter()
        .filter_map(|period| {
            let starts: Vec<DateTime<Utc>> = period
                .member_game_ids
                .iter()
                .filter_map(|id| records.get(id.as_str()).and_then(|r| r.start_time))
                .collect();

            let start = match &period.closed_by {
                Some(boundary) => local_day_end(boundary.date_parsed?, min_offset),
                None => starts.iter().min().copied()?,
            };
            let end = match &period.opened_by {
                Some(boundary) => local_day_start(boundary.date_parsed?, max_offset),
                None => starts.iter().max().copied()?,
            };

            (start < end).then_some(SafeWindow {
                period_index: period.period_index,
                start,
                end,
            })
        })
        .collect()
}

/// Home games of the team that are not listed but fall into exactly one
/// safe window, paired with that window's period index.
pub fn place_unlisted<'a>(
    records: &[&'a GameRecord],
    listed: &HashSet<&str>,
    windows: &[SafeWindow],
) -> Vec<(&'a GameRecord, usize)> {
    records
        .iter()
        .filter(|r| r.is_home && !listed.contains(r.game_id.as_str()))
        .filter_map(|r| {
            let start = r.start_time?;
            let mut hits = windows.iter().filter(|w| w.contains(start));
            match (hits.next(), hits.next()) {
                (Some(window), None) => Some((*r, window.period_index)),
                _ => None,
            }
        })
        .collect()
}
