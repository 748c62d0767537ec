//! Parsed rows of the attendance table.
//!
//! The arena page lists games and ticket price updates in one table, newest
//! first. Each data row becomes an [`ArenaEvent`], decided once when the row
//! is parsed. The rows of one table form an [`EventSequence`], ordered by
//! table position.
//!
//! # Table position
//!
//! `row_index` is the zero-based position of the row among the data rows of
//! the table, with 0 being the most recent. Calendar dates are not a total
//! order (a game and a price update can share a date), so every ordering
//! decision downstream uses `row_index`.
//!
//! # Example
//!
//! ```rust
//! use arena_types::{ArenaEvent, EventSequence, GameEvent, PriceChange, PriceSnapshot};
//!
//! let events = vec![
//!     ArenaEvent::Game(GameEvent::new(0, "7/6/2025").with_game_id("134948393")),
//!     ArenaEvent::PriceChange(PriceChange::new(2, "7/1/2025", PriceSnapshot::new())),
//! ];
//!
//! // Row 1 was skipped by the parser; its position stays reserved.
//! let seq = EventSequence::new(events, 3).unwrap();
//! assert_eq!(seq.len(), 2);
//! assert_eq!(seq.row_count(), 3);
//! ```

use crate::{PriceSnapshot, SeatCategory, TypeError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A game row of the attendance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Position among the table's data rows (0 = most recent).
    pub row_index: usize,

    /// Match identifier taken from the row's link, if it had a usable one.
    pub game_id: Option<String>,

    /// Date text as printed in the table.
    pub date_raw: String,

    /// Local calendar date, if `date_raw` could be parsed.
    pub date_parsed: Option<NaiveDate>,

    pub opponent: String,

    /// Attendance per seat category. Categories with unreadable cells are
    /// missing from the map rather than mapped to zero.
    pub attendance: BTreeMap<SeatCategory, u32>,

    pub total_attendance: Option<u32>,

    /// Competition label from the last column ("League", "Cup", ...).
    pub game_type: Option<String>,
}

impl GameEvent {
    /// Create a game event with only position and date text set.
    pub fn new(row_index: usize, date_raw: impl Into<String>) -> Self {
        Self {
            row_index,
            game_id: None,
            date_raw: date_raw.into(),
            date_parsed: None,
            opponent: String::new(),
            attendance: BTreeMap::new(),
            total_attendance: None,
            game_type: None,
        }
    }

    pub fn with_game_id(mut self, game_id: impl Into<String>) -> Self {
        self.game_id = Some(game_id.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date_parsed = Some(date);
        self
    }

    pub fn with_opponent(mut self, opponent: impl Into<String>) -> Self {
        self.opponent = opponent.into();
        self
    }

    pub fn with_attendance(mut self, seat: SeatCategory, count: u32) -> Self {
        self.attendance.insert(seat, count);
        self
    }
}

/// A ticket price update row of the attendance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    pub row_index: usize,
    pub date_raw: String,
    pub date_parsed: Option<NaiveDate>,

    /// Prices listed on the row.
    pub prices: PriceSnapshot,

    /// Label text of the row, usually "Ticket Price Update".
    pub note: String,
}

impl PriceChange {
    pub fn new(row_index: usize, date_raw: impl Into<String>, prices: PriceSnapshot) -> Self {
        Self {
            row_index,
            date_raw: date_raw.into(),
            date_parsed: None,
            prices,
            note: String::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date_parsed = Some(date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// One classified data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArenaEvent {
    Game(GameEvent),
    PriceChange(PriceChange),
}

impl ArenaEvent {
    #[inline]
    pub fn row_index(&self) -> usize {
        match self {
            ArenaEvent::Game(g) => g.row_index,
            ArenaEvent::PriceChange(p) => p.row_index,
        }
    }

    pub fn date_parsed(&self) -> Option<NaiveDate> {
        match self {
            ArenaEvent::Game(g) => g.date_parsed,
            ArenaEvent::PriceChange(p) => p.date_parsed,
        }
    }

    pub fn as_game(&self) -> Option<&GameEvent> {
        match self {
            ArenaEvent::Game(g) => Some(g),
            ArenaEvent::PriceChange(_) => None,
        }
    }

    pub fn as_price_change(&self) -> Option<&PriceChange> {
        match self {
            ArenaEvent::Game(_) => None,
            ArenaEvent::PriceChange(p) => Some(p),
        }
    }
}

/// Events parsed from one attendance table, in table order.
///
/// Construction checks that row indices are strictly increasing and lie
/// below `row_count`, the number of data rows in the table (skipped rows
/// included). The sequence is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSequence {
    events: Vec<ArenaEvent>,
    row_count: usize,
}

impl EventSequence {
    /// Build a sequence from events already in table order.
    ///
    /// # Errors
    ///
    /// [`TypeError::RowOrder`] if two events are not strictly increasing,
    /// [`TypeError::RowOutOfRange`] if an event index is not below `row_count`.
    pub fn new(events: Vec<ArenaEvent>, row_count: usize) -> Result<Self, TypeError> {
        let mut previous: Option<usize> = None;
        for event in &events {
            let current = event.row_index();
            if let Some(previous) = previous {
                if current <= previous {
                    return Err(TypeError::RowOrder { previous, current });
                }
            }
            if current >= row_count {
                return Err(TypeError::RowOutOfRange {
                    index: current,
                    row_count,
                });
            }
            previous = Some(current);
        }
        Ok(Self { events, row_count })
    }

    /// An empty sequence for a table with no data rows.
    pub fn empty() -> Self {
        Self {
            events: Vec::new(),
            row_count: 0,
        }
    }

    /// Number of data rows in the source table, including skipped ones.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of parsed events.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArenaEvent> {
        self.events.iter()
    }

    pub fn events(&self) -> &[ArenaEvent] {
        &self.events
    }

    /// Look up the event parsed from a given table row.
    pub fn get(&self, row_index: usize) -> Option<&ArenaEvent> {
        self.events
            .binary_search_by_key(&row_index, ArenaEvent::row_index)
            .ok()
            .map(|i| &self.events[i])
    }

    pub fn games(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter_map(ArenaEvent::as_game)
    }

    pub fn price_changes(&self) -> impl Iterator<Item = &PriceChange> {
        self.events.iter().filter_map(ArenaEvent::as_price_change)
    }
}

impl<'a> IntoIterator for &'a EventSequence {
    type Item = &'a ArenaEvent;
    type IntoIter = std::slice::Iter<'a, ArenaEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(idx: usize, id: &str) -> ArenaEvent {
        ArenaEvent::Game(GameEvent::new(idx, "7/6/2025").with_game_id(id))
    }

    fn change(idx: usize) -> ArenaEvent {
        ArenaEvent::PriceChange(PriceChange::new(idx, "7/1/2025", PriceSnapshot::new()))
    }

    #[test]
    fn test_sequence_accepts_gaps() {
        let seq = EventSequence::new(vec![game(0, "a"), change(2), game(5, "b")], 6).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.games().count(), 2);
        assert_eq!(seq.price_changes().count(), 1);
        assert!(seq.get(1).is_none());
        assert_eq!(seq.get(5).map(ArenaEvent::row_index), Some(5));
    }

    #[test]
    fn test_sequence_rejects_repeated_index() {
        let err = EventSequence::new(vec![game(0, "a"), game(0, "b")], 2).unwrap_err();
        assert!(matches!(err, TypeError::RowOrder { previous: 0, current: 0 }));
    }

    #[test]
    fn test_sequence_rejects_descending_index() {
        let err = EventSequence::new(vec![game(3, "a"), change(1)], 4).unwrap_err();
        assert!(matches!(err, TypeError::RowOrder { previous: 3, current: 1 }));
    }

    #[test]
    fn test_sequence_rejects_index_past_row_count() {
        let err = EventSequence::new(vec![game(0, "a"), game(4, "b")], 4).unwrap_err();
        assert!(matches!(err, TypeError::RowOutOfRange { index: 4, row_count: 4 }));
    }

    #[test]
    fn test_empty_sequence() {
        let seq = EventSequence::empty();
        assert!(seq.is_empty());
        assert_eq!(seq.row_count(), 0);
    }

    #[test]
    fn test_event_serde_tag() {
        let json = serde_json::to_value(change(1)).unwrap();
        assert_eq!(json["type"], "price_change");
        assert_eq!(json["row_index"], 1);
    }
}
