//! Error types for the indexer.

use thiserror::Error;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Error from the ingestion layer.
    #[error("ingestion error: {0}")]
    Ingestion(#[from] arena_ingestion::IngestionError),

    /// Error from the game store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The same game showed up twice while assigning periods.
    #[error("game {game_id} assigned twice (rows {first_row} and {second_row})")]
    DuplicateGameAssignment {
        game_id: String,
        first_row: usize,
        second_row: usize,
    },

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
}

/// Errors reported by a [`GameStore`](crate::GameStore).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The record to update does not exist.
    #[error("game not found: {0}")]
    NotFound(String),

    /// Backend failure, carried as its message.
    #[error("backend error: {0}")]
    Backend(String),
}
