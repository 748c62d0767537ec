//! Error types for the ingestion layer.
//!
//! Each variant owns its data as plain strings, so the error stays `Send`
//! and `'static` even though `scraper` selector errors borrow their input.

use thiserror::Error;

/// Errors that can occur while reading or parsing an arena page.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// No element matched the attendance table selector.
    #[error("attendance table not found: {0}")]
    TableNotFound(String),

    /// The table exists but lacks structure needed to parse it.
    #[error("invalid table structure: {0}")]
    InvalidTableStructure(String),

    /// A CSS selector from the table layout failed to parse.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// The match-id pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Parsed rows could not form an event sequence.
    #[error("type error: {0}")]
    Type(#[from] arena_types::TypeError),

    /// Reading a saved page failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No page available (e.g., mock not configured).
    #[error("no data: {0}")]
    NoData(String),
}

/// Why a single data row was skipped.
///
/// Row errors never abort a parse; they end up as diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowParseError {
    /// The row has fewer cells than the layout requires.
    #[error("row has {found} cells, expected at least {required}")]
    TooFewColumns { found: usize, required: usize },

    /// Neither a link nor a price-update marker.
    #[error("row matches neither a game nor a price update")]
    Unclassified,

    /// Both a link and a price-update marker.
    #[error("row carries both a link and a price-update marker")]
    Ambiguous,
}
