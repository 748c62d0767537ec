//! arena-indexer: Pricing reconciliation for arena attendance tables.
//!
//! This crate provides the [`ReconciliationService`], the main entry point
//! for turning an arena page into ticket prices on stored games.
//!
//! # Overview
//!
//! The service:
//! - Parses the attendance table via `arena-ingestion`
//! - Splits rows into pricing periods by table position ([`PeriodAssigner`])
//! - Matches listed games to stored records by id
//! - Infers the venue's UTC offset from matched games ([`TimezoneDetector`])
//! - Writes each period's prices onto its games through a [`GameStore`]
//!
//! [`BatchReconciler`] runs the service over many teams with bounded
//! concurrency and one reconciliation in flight per team.
//!
//! # Example
//!
//! ```rust
//! use arena_indexer::{MemoryStore, ReconcilerConfig, ReconciliationService};
//! use arena_types::GameRecord;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::with_games(vec![GameRecord::new("134948393", "27795")]));
//!     let service = ReconciliationService::new(store.clone(), ReconcilerConfig::default())?;
//!
//!     let html = r#"<table id="cphContent_seatingStats">
//!       <tr class="tableHeader"><th>Date</th></tr>
//!       <tr><td>7/8/2025</td><td>Ticket Price Update</td><td>$15</td><td>$45</td>
//!           <td>$90</td><td>$900</td><td>-1</td><td></td></tr>
//!       <tr><td><a href="/match/134948393/boxscore.aspx">7/6/2025</a></td><td>Rivals</td>
//!           <td>9500</td><td>2100</td><td>450</td><td>40</td><td>12090</td><td>League</td></tr>
//!     </table>"#;
//!
//!     let report = service.reconcile("27795", html).await;
//!     assert_eq!(report.games_updated, 1);
//!     assert!(store.get("134948393").await.unwrap().prices.is_some());
//!     Ok(())
//! }
//! ```

mod batch;
pub mod config;
mod error;
mod period;
mod reconcile;
mod store;
pub mod timezone;
mod unlisted;

pub use batch::BatchReconciler;
pub use config::{BatchConfig, ReconcilerConfig};
pub use error::{IndexerError, StoreError};
pub use period::PeriodAssigner;
pub use reconcile::{DocumentAnalysis, ReconciliationService};
pub use store::{GameStore, MemoryStore};
pub use timezone::{MatchedPair, TimezoneDetector};
pub use unlisted::SafeWindow;

// Re-export commonly used types from dependencies for convenience
pub use arena_ingestion::{DocumentSource, FileSource, MockSource, TableLayout};
pub use arena_types::{BatchReport, PricingPeriod, ReconciliationReport, ReportStatus, TimezoneDetection};
