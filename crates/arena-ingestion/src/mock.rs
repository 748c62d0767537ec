//! Mock document source for testing.
//!
//! `MockSource` implements `DocumentSource` with pages held in memory,
//! allowing tests to run without touching disk or network.
//!
//! # Usage
//!
//! ```rust,ignore
//! use arena_ingestion::{DocumentSource, MockSource};
//!
//! let mock = MockSource::new().with_page("27795", "<html>...</html>");
//! let html = mock.fetch_arena_page("27795").await?;
//! ```

use crate::{error::IngestionError, DocumentSource};
use std::collections::HashMap;

/// In-memory document source keyed by team id.
#[derive(Debug, Default, Clone)]
pub struct MockSource {
    /// Pages to return from `fetch_arena_page`.
    pub pages: HashMap<String, String>,
}

impl MockSource {
    /// Create a new empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page returned for a team (builder pattern).
    pub fn with_page(mut self, team_id: &str, html: impl Into<String>) -> Self {
        self.pages.insert(team_id.to_string(), html.into());
        self
    }
}

impl DocumentSource for MockSource {
    async fn fetch_arena_page(&self, team_id: &str) -> Result<String, IngestionError> {
        self.pages
            .get(team_id)
            .cloned()
            .ok_or_else(|| IngestionError::NoData(format!("no mock page for team {team_id}")))
    }
}
