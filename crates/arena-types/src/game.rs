//! Stored game records.

use crate::PriceSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A game as known to the game store.
///
/// Reconciliation only reads `game_id`, `start_time` and `is_home`, and only
/// ever writes `prices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Match identifier, the same string the arena page links to.
    pub game_id: String,

    /// Team whose arena hosted (or will host) the game.
    pub team_id: String,

    /// Scheduled start, stored in UTC.
    pub start_time: Option<DateTime<Utc>>,

    /// True when `team_id` was the home team.
    #[serde(default = "default_is_home")]
    pub is_home: bool,

    /// Ticket prices in effect for the game, once known.
    #[serde(default)]
    pub prices: Option<PriceSnapshot>,
}

fn default_is_home() -> bool {
    true
}

impl GameRecord {
    /// Create a home game record with no start time or prices.
    pub fn new(game_id: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            team_id: team_id.into(),
            start_time: None,
            is_home: true,
            prices: None,
        }
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_prices(mut self, prices: PriceSnapshot) -> Self {
        self.prices = Some(prices);
        self
    }

    pub fn away(mut self) -> Self {
        self.is_home = false;
        self
    }
}
