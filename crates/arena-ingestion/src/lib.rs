//! # arena-ingestion
//!
//! Ingestion layer for BuzzerBeater arena pages.
//!
//! This crate turns a raw arena page into an
//! [`EventSequence`](arena_types::EventSequence):
//!
//! - [`DocumentSource`] hands out the raw page for a team
//! - [`TableIsolator`] finds the attendance table and checks its structure
//! - [`RowParser`] classifies each row as a game or a price change
//!
//! ## Quick Start
//!
//! ```rust
//! use arena_ingestion::{RowParser, TableIsolator, TableLayout};
//! use scraper::Html;
//!
//! let html = r#"<table id="cphContent_seatingStats">
//!   <tr class="tableHeader"><th>Date</th></tr>
//!   <tr><td><a href="/match/134948393/boxscore.aspx">7/6/2025</a></td><td>Rivals</td>
//!       <td>9500</td><td>2100</td><td>450</td><td>40</td><td>12090</td><td>League</td></tr>
//! </table>"#;
//!
//! let document = Html::parse_document(html);
//! let isolator = TableIsolator::new(TableLayout::default()).unwrap();
//! let table = isolator.isolate(&document).unwrap();
//!
//! let parsed = RowParser::new(TableLayout::default()).unwrap().parse(&table).unwrap();
//! assert_eq!(parsed.events.games().count(), 1);
//! ```
//!
//! ## Send-ness
//!
//! `scraper::Html` is not `Send`. Parse the page, extract the events and
//! drop the document before the next `.await`.

pub mod config;
pub mod error;
mod file_source;
mod mock;
mod row_parser;
mod table;

pub use config::TableLayout;
pub use error::{IngestionError, RowParseError};
pub use file_source::FileSource;
pub use mock::MockSource;
pub use row_parser::{parse_count, parse_price, ParsedRows, RowKind, RowParser};
pub use table::{AttendanceTable, TableIsolator, TableStructure};

/// Source of raw arena pages.
///
/// Uses native async syntax rather than `async_trait` to avoid boxing the
/// returned futures.
///
/// ## Implementors
///
/// - [`FileSource`]: pages saved on disk
/// - [`MockSource`]: in-memory pages for tests
///
/// Fetching, sessions and retries of live pages are left to implementors.
pub trait DocumentSource: Send + Sync {
    /// Fetch the arena page of a team as markup text.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::NoData`] if no page exists for the team.
    fn fetch_arena_page(
        &self,
        team_id: &str,
    ) -> impl std::future::Future<Output = Result<String, IngestionError>> + Send;
}
