//! arena-batch: Reconcile saved arena pages into the game store.
//!
//! Reads one saved page per team, reconciles it against a JSON game store,
//! saves the store and prints the batch report as JSON on stdout.
//!
//! # Environment Variables
//!
//! - `ARENA_PAGES_DIR`: directory of saved `team_<id>_arenapage.html` pages
//! - `ARENA_STORE_PATH`: JSON game store (default: `./games.json`)
//! - `ARENA_TEAM_IDS`: comma-separated team ids (default: every saved page)
//!
//! Reconciliation and batch settings are read by `arena-indexer`.

mod store;

use arena_indexer::{BatchConfig, BatchReconciler, FileSource, ReconcilerConfig, ReconciliationService};
use std::sync::Arc;
use store::{JsonFileStore, DEFAULT_STORE_PATH};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arena_batch=info,arena_indexer=info,arena_ingestion=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let reconciler_config = ReconcilerConfig::from_env();
    let batch_config = BatchConfig::from_env();
    let source = FileSource::from_env();
    let store_path = std::env::var("ARENA_STORE_PATH").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());

    let team_ids = match std::env::var("ARENA_TEAM_IDS") {
        Ok(ids) if !ids.trim().is_empty() => parse_team_ids(&ids),
        _ => source.team_ids().await?,
    };

    tracing::info!(
        "Starting arena-batch: {} teams from {} (store: {}, concurrency: {})",
        team_ids.len(),
        source.dir().display(),
        store_path,
        batch_config.max_concurrent_teams
    );

    let store = Arc::new(JsonFileStore::load(&store_path).await?);
    let service = ReconciliationService::new(Arc::clone(&store), reconciler_config)?;
    let batch = BatchReconciler::new(Arc::new(service), Arc::new(source), batch_config);

    let report = batch.reconcile_teams(&team_ids).await;
    store.save().await?;

    for error in &report.errors {
        tracing::warn!("team {} failed: {}", error.team_id, error.message);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Split a comma-separated id list, dropping blanks.
fn parse_team_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
