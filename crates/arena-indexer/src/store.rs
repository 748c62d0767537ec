//! Game store abstraction.
//!
//! Reconciliation reads a team's games once, then writes prices game by
//! game. Writes must be idempotent: writing the same prices twice leaves the
//! same stored state.

use crate::error::StoreError;
use arena_types::{GameRecord, PriceSnapshot};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persistent store of game records.
///
/// Uses native async syntax like [`DocumentSource`](arena_ingestion::DocumentSource).
/// `Send + Sync` so a store can be shared behind an `Arc` across tasks.
pub trait GameStore: Send + Sync {
    /// All known games of a team, home and away.
    fn games_for_team(
        &self,
        team_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<GameRecord>, StoreError>> + Send;

    /// Prices the team's arena charges today, if known.
    fn current_prices(
        &self,
        team_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<PriceSnapshot>, StoreError>> + Send;

    /// Overwrite the prices of one game.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the game does not exist.
    fn write_game_prices(
        &self,
        game_id: &str,
        prices: &PriceSnapshot,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// In-memory game store.
///
/// Cloning shares the underlying maps, so a test can keep a handle and
/// inspect what a service wrote.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    games: Arc<RwLock<HashMap<String, GameRecord>>>,
    current: Arc<RwLock<HashMap<String, PriceSnapshot>>>,
    failing_writes: Arc<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `games`.
    pub fn with_games(games: impl IntoIterator<Item = GameRecord>) -> Self {
        let map = games.into_iter().map(|g| (g.game_id.clone(), g)).collect();
        Self {
            games: Arc::new(RwLock::new(map)),
            ..Self::default()
        }
    }

    /// Set a team's current prices (builder pattern).
    ///
    /// Meant for setup before the store is shared; use
    /// [`set_current_prices`](Self::set_current_prices) afterwards.
    pub fn with_current_prices(self, team_id: &str, prices: PriceSnapshot) -> Self {
        match self.current.try_write() {
            Ok(mut current) => {
                current.insert(team_id.to_string(), prices);
            }
            Err(_) => tracing::warn!("current prices for team {} not set: store is locked", team_id),
        }
        self
    }

    /// Make writes for one game fail with a backend error (builder pattern).
    pub fn with_failing_write(self, game_id: &str) -> Self {
        let mut failing = (*self.failing_writes).clone();
        failing.insert(game_id.to_string());
        Self {
            failing_writes: Arc::new(failing),
            ..self
        }
    }

    /// Insert or replace a record.
    pub async fn insert(&self, record: GameRecord) {
        self.games.write().await.insert(record.game_id.clone(), record);
    }

    /// Replace a team's current prices.
    pub async fn set_current_prices(&self, team_id: &str, prices: PriceSnapshot) {
        self.current.write().await.insert(team_id.to_string(), prices);
    }

    pub async fn get(&self, game_id: &str) -> Option<GameRecord> {
        self.games.read().await.get(game_id).cloned()
    }

    /// All records, sorted by game id.
    pub async fn records(&self) -> Vec<GameRecord> {
        let mut records: Vec<GameRecord> = self.games.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        records
    }
}

impl GameStore for MemoryStore {
    async fn games_for_team(&self, team_id: &str) -> Result<Vec<GameRecord>, StoreError> {
        let mut games: Vec<GameRecord> = self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.team_id == team_id)
            .cloned()
            .collect();
        games.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        Ok(games)
    }

    async fn current_prices(&self, team_id: &str) -> Result<Option<PriceSnapshot>, StoreError> {
        Ok(self.current.read().await.get(team_id).cloned())
    }

    async fn write_game_prices(&self, game_id: &str, prices: &PriceSnapshot) -> Result<(), StoreError> {
        if self.failing_writes.contains(game_id) {
            return Err(StoreError::Backend(format!("write rejected for game {game_id}")));
        }
        let mut games = self.games.write().await;
        let record = games
            .get_mut(game_id)
            .ok_or_else(|| StoreError::NotFound(game_id.to_string()))?;
        record.prices = Some(prices.clone());
        Ok(())
    }
}
