//! Configuration for the ingestion layer.
//!
//! [`TableLayout`] describes where the attendance table lives on the arena
//! page and how its columns are laid out. The defaults match the BuzzerBeater
//! arena page; every field can be overridden with a `with_*` builder.
//!
//! # Environment Variables
//!
//! - `ARENA_DATE_FORMAT`: chrono format of the date column (default: `%m/%d/%Y`)
//! - `ARENA_PAGES_DIR`: directory of saved arena pages for [`FileSource`](crate::FileSource)
//!   (default: `./arena_pages`)

use std::env;
use std::path::PathBuf;

/// Element id of the attendance table on the arena page.
pub const DEFAULT_TABLE_ID: &str = "cphContent_seatingStats";

/// Class of the header row.
pub const DEFAULT_HEADER_CLASS: &str = "tableHeader";

/// Label printed in the opponent column of price-change rows.
pub const DEFAULT_PRICE_UPDATE_LABEL: &str = "Ticket Price Update";

/// Column headers in table order.
pub const EXPECTED_HEADERS: [&str; 8] = [
    "Date",
    "Opponent",
    "Bleachers",
    "Lower Tier",
    "Courtside Seats",
    "Luxury Boxes",
    "Total Attendance",
    "Game Type",
];

/// Default directory for saved arena pages.
pub const DEFAULT_PAGES_DIR: &str = "./arena_pages";

/// Column layout of the attendance table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// Element id of the table.
    pub table_id: String,

    /// Class marking the header row.
    pub header_class: String,

    /// Rows with fewer cells are skipped.
    pub min_columns: usize,

    /// chrono format of the date column.
    pub date_format: String,

    /// Opponent-column text marking a price-change row (case-insensitive).
    pub price_update_label: String,

    /// Total-attendance text marking a price-change row.
    pub price_update_attendance: String,

    pub date_column: usize,
    pub opponent_column: usize,

    /// First of the four seat columns; the others follow in
    /// [`SeatCategory::ALL`](arena_types::SeatCategory::ALL) order.
    pub first_seat_column: usize,

    pub total_attendance_column: usize,
    pub game_type_column: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            table_id: DEFAULT_TABLE_ID.to_string(),
            header_class: DEFAULT_HEADER_CLASS.to_string(),
            min_columns: EXPECTED_HEADERS.len(),
            date_format: "%m/%d/%Y".to_string(),
            price_update_label: DEFAULT_PRICE_UPDATE_LABEL.to_string(),
            price_update_attendance: "-1".to_string(),
            date_column: 0,
            opponent_column: 1,
            first_seat_column: 2,
            total_attendance_column: 6,
            game_type_column: 7,
        }
    }
}

impl TableLayout {
    /// Default layout with the date format taken from `ARENA_DATE_FORMAT`.
    pub fn from_env() -> Self {
        let layout = Self::default();
        match env::var("ARENA_DATE_FORMAT") {
            Ok(format) if !format.trim().is_empty() => layout.with_date_format(format.trim()),
            _ => layout,
        }
    }

    pub fn with_table_id(mut self, table_id: &str) -> Self {
        self.table_id = table_id.to_string();
        self
    }

    pub fn with_header_class(mut self, header_class: &str) -> Self {
        self.header_class = header_class.to_string();
        self
    }

    pub fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }

    pub fn with_date_format(mut self, date_format: &str) -> Self {
        self.date_format = date_format.to_string();
        self
    }

    pub fn with_price_update_label(mut self, label: &str) -> Self {
        self.price_update_label = label.to_string();
        self
    }

    /// CSS selector for the table element.
    pub fn table_selector(&self) -> String {
        format!("table#{}", self.table_id)
    }
}

/// Directory of saved arena pages, from `ARENA_PAGES_DIR`.
pub fn pages_dir_from_env() -> PathBuf {
    env::var("ARENA_PAGES_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PAGES_DIR))
}
