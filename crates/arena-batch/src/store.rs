//! Game store persisted as a single JSON file.
//!
//! The file holds the stored games and the current prices per team:
//!
//! ```json
//! {
//!   "games": [{ "game_id": "134948393", "team_id": "27795", "start_time": "2025-07-07T00:00:00Z" }],
//!   "current_prices": { "27795": { "bleachers": "18", "lower_tier": "50", "courtside": "95", "luxury_boxes": "950" } }
//! }
//! ```
//!
//! Writes go to memory; [`JsonFileStore::save`] persists them.

use anyhow::Context;
use arena_indexer::{GameStore, StoreError};
use arena_types::{GameRecord, PriceSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default location of the store file.
pub const DEFAULT_STORE_PATH: &str = "./games.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    games: Vec<GameRecord>,
    #[serde(default)]
    current_prices: BTreeMap<String, PriceSnapshot>,
}

#[derive(Debug, Default)]
struct State {
    games: HashMap<String, GameRecord>,
    current_prices: BTreeMap<String, PriceSnapshot>,
}

/// JSON-file backed [`GameStore`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Arc<RwLock<State>>,
}

impl JsonFileStore {
    /// Load the store at `path`. A missing file starts an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let file = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<StoreFile>(&bytes)
                .with_context(|| format!("invalid store file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("store file {} not found, starting empty", path.display());
                StoreFile::default()
            }
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };

        tracing::info!(
            "loaded {} games and {} current price sets from {}",
            file.games.len(),
            file.current_prices.len(),
            path.display()
        );

        let state = State {
            games: file.games.into_iter().map(|g| (g.game_id.clone(), g)).collect(),
            current_prices: file.current_prices,
        };
        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current state back to the file.
    pub async fn save(&self) -> anyhow::Result<()> {
        let state = self.state.read().await;
        let mut games: Vec<GameRecord> = state.games.values().cloned().collect();
        games.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        let file = StoreFile {
            games,
            current_prices: state.current_prices.clone(),
        };

        let json = serde_json::to_vec_pretty(&file)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::info!("saved {} games to {}", file.games.len(), self.path.display());
        Ok(())
    }
}

impl GameStore for JsonFileStore {
    async fn games_for_team(&self, team_id: &str) -> Result<Vec<GameRecord>, StoreError> {
        let state = self.state.read().await;
        let mut games: Vec<GameRecord> = state.games.values().filter(|g| g.team_id == team_id).cloned().collect();
        games.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        Ok(games)
    }

    async fn current_prices(&self, team_id: &str) -> Result<Option<PriceSnapshot>, StoreError> {
        Ok(self.state.read().await.current_prices.get(team_id).cloned())
    }

    async fn write_game_prices(&self, game_id: &str, prices: &PriceSnapshot) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let game = state
            .games
            .get_mut(game_id)
            .ok_or_else(|| StoreError::NotFound(game_id.to_string()))?;
        game.prices = Some(prices.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("arena-batch-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let store = JsonFileStore::load(temp_path("missing")).await.unwrap();
        assert!(store.games_for_team("1").await.unwrap().is_empty());
        assert_eq!(store.current_prices("1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_writes_survive_save_and_load() {
        let path = temp_path("roundtrip");
        let seed = r#"{
            "games": [
                {"game_id": "g1", "team_id": "1", "start_time": "2025-07-07T00:00:00Z"},
                {"game_id": "g2", "team_id": "2"}
            ],
            "current_prices": {"1": {"bleachers": "18", "lower_tier": null, "courtside": null, "luxury_boxes": null}}
        }"#;
        tokio::fs::write(&path, seed).await.unwrap();

        let store = JsonFileStore::load(&path).await.unwrap();
        assert_eq!(store.games_for_team("1").await.unwrap().len(), 1);
        assert_eq!(store.current_prices("1").await.unwrap().unwrap().bleachers, Some(dec!(18)));

        let prices = PriceSnapshot::new().with_price(arena_types::SeatCategory::Courtside, dec!(90));
        store.write_game_prices("g1", &prices).await.unwrap();
        assert!(matches!(
            store.write_game_prices("nope", &prices).await,
            Err(StoreError::NotFound(_))
        ));
        store.save().await.unwrap();

        let reloaded = JsonFileStore::load(&path).await.unwrap();
        let g1 = &reloaded.games_for_team("1").await.unwrap()[0];
        assert_eq!(g1.prices, Some(prices));
        assert!(g1.is_home);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let path = temp_path("invalid");
        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(JsonFileStore::load(&path).await.is_err());
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
