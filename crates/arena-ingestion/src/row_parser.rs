//! Classifying and parsing attendance table rows.
//!
//! Each data row is looked at on its own:
//!
//! - a row carrying a link (`<a href=...>`) and no price-update marker is a
//!   game; its identifier comes from the first `.../match/<id>/...` link
//! - a row without links whose opponent column holds the price-update label,
//!   or whose total-attendance column reads `-1`, is a price change
//! - anything else is skipped with a diagnostic
//!
//! Numbers are read leniently (`$`, thousands separators and spaces are
//! ignored). An unreadable cell gives `None`, never zero.

use crate::config::TableLayout;
use crate::error::{IngestionError, RowParseError};
use crate::table::{cell_text, parse_selector, AttendanceTable};
use arena_types::{
    ArenaEvent, Diagnostic, DiagnosticStage, EventSequence, GameEvent, PriceChange, PriceSnapshot,
    SeatCategory,
};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Selector};
use std::collections::BTreeMap;
use std::str::FromStr;

/// How a row was classified, before field extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Game,
    PriceChange,
}

/// Output of parsing one table.
#[derive(Debug, Clone)]
pub struct ParsedRows {
    pub events: EventSequence,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedRows {
    /// Number of rows that were skipped.
    pub fn skipped_rows(&self) -> usize {
        self.events.row_count() - self.events.len()
    }
}

/// Turns attendance table rows into [`ArenaEvent`]s.
#[derive(Debug, Clone)]
pub struct RowParser {
    layout: TableLayout,
    cell_sel: Selector,
    link_sel: Selector,
    match_id: Regex,
}

impl RowParser {
    pub fn new(layout: TableLayout) -> Result<Self, IngestionError> {
        Ok(Self {
            cell_sel: parse_selector("td")?,
            link_sel: parse_selector("a[href]")?,
            match_id: Regex::new(r"(?:^|/)match/([A-Za-z0-9]+)(?:[/?#]|$)")?,
            layout,
        })
    }

    /// Parse every data row of a table.
    ///
    /// Row positions come from the table, so a skipped row still uses up
    /// its index.
    pub fn parse(&self, table: &AttendanceTable<'_>) -> Result<ParsedRows, IngestionError> {
        let mut events = Vec::new();
        let mut diagnostics = Vec::new();

        for (row_index, row) in table.data_rows().iter().enumerate() {
            let cells: Vec<ElementRef<'_>> = row.select(&self.cell_sel).collect();
            match self.parse_row(row_index, &cells, &mut diagnostics) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!("skipping row {}: {}", row_index, e);
                    diagnostics.push(Diagnostic::warning(DiagnosticStage::Row, e.to_string()).at_row(row_index));
                }
            }
        }

        let events = EventSequence::new(events, table.row_count())?;
        tracing::debug!(
            "parsed {} events from {} rows ({} games, {} price changes)",
            events.len(),
            events.row_count(),
            events.games().count(),
            events.price_changes().count()
        );

        Ok(ParsedRows { events, diagnostics })
    }

    /// Classify a row from its cells alone.
    pub fn classify(&self, cells: &[ElementRef<'_>]) -> Result<RowKind, RowParseError> {
        if cells.len() < self.layout.min_columns {
            return Err(RowParseError::TooFewColumns {
                found: cells.len(),
                required: self.layout.min_columns,
            });
        }

        let has_link = cells.iter().any(|c| c.select(&self.link_sel).next().is_some());
        let has_marker = self.has_price_update_marker(cells);

        match (has_link, has_marker) {
            (true, false) => Ok(RowKind::Game),
            (false, true) => Ok(RowKind::PriceChange),
            (true, true) => Err(RowParseError::Ambiguous),
            (false, false) => Err(RowParseError::Unclassified),
        }
    }

    fn has_price_update_marker(&self, cells: &[ElementRef<'_>]) -> bool {
        let label = self.layout.price_update_label.to_lowercase();
        let opponent = self.text_at(cells, self.layout.opponent_column).to_lowercase();
        let total = self.text_at(cells, self.layout.total_attendance_column);
        opponent.contains(&label) || total == self.layout.price_update_attendance
    }

    fn parse_row(
        &self,
        row_index: usize,
        cells: &[ElementRef<'_>],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<ArenaEvent, RowParseError> {
        let kind = self.classify(cells)?;

        let date_raw = self.text_at(cells, self.layout.date_column);
        let date_parsed = self.parse_date(&date_raw);
        if date_parsed.is_none() {
            diagnostics.push(
                Diagnostic::warning(DiagnosticStage::Row, format!("unparsable date {:?}", date_raw))
                    .at_row(row_index),
            );
        }

        match kind {
            RowKind::Game => {
                let game_id = self.extract_game_id(cells);
                if game_id.is_none() {
                    diagnostics.push(
                        Diagnostic::warning(DiagnosticStage::Row, "game row has no match identifier")
                            .at_row(row_index),
                    );
                }

                let mut attendance = BTreeMap::new();
                for seat in SeatCategory::ALL {
                    let text = self.text_at(cells, self.layout.first_seat_column + seat.column_offset());
                    if let Some(count) = parse_count(&text) {
                        attendance.insert(seat, count);
                    }
                }

                let game_type = self.text_at(cells, self.layout.game_type_column);

                Ok(ArenaEvent::Game(GameEvent {
                    row_index,
                    game_id,
                    date_raw,
                    date_parsed,
                    opponent: self.text_at(cells, self.layout.opponent_column),
                    attendance,
                    total_attendance: parse_count(&self.text_at(cells, self.layout.total_attendance_column)),
                    game_type: (!game_type.is_empty()).then_some(game_type),
                }))
            }
            RowKind::PriceChange => {
                let prices = PriceSnapshot::from_columns(SeatCategory::ALL.map(|seat| {
                    parse_price(&self.text_at(cells, self.layout.first_seat_column + seat.column_offset()))
                }));
                if prices.is_empty() {
                    diagnostics.push(
                        Diagnostic::warning(DiagnosticStage::Row, "price update row has no readable prices")
                            .at_row(row_index),
                    );
                }

                Ok(ArenaEvent::PriceChange(PriceChange {
                    row_index,
                    date_raw,
                    date_parsed,
                    prices,
                    note: self.text_at(cells, self.layout.opponent_column),
                }))
            }
        }
    }

    /// First match identifier linked from the row.
    fn extract_game_id(&self, cells: &[ElementRef<'_>]) -> Option<String> {
        cells
            .iter()
            .flat_map(|c| c.select(&self.link_sel))
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| self.match_id.captures(href).map(|c| c[1].to_string()))
    }

    fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), &self.layout.date_format).ok()
    }

    fn text_at(&self, cells: &[ElementRef<'_>], column: usize) -> String {
        cells.get(column).map(cell_text).unwrap_or_default()
    }
}

fn strip_number(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect()
}

/// Lenient price parse: `"$1,250"` -> `1250`; empty or garbage -> `None`.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned = strip_number(text);
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok().filter(|d| !d.is_sign_negative())
}

/// Lenient attendance parse. Negative counts (the `-1` marker) give `None`.
pub fn parse_count(text: &str) -> Option<u32> {
    let cleaned = strip_number(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<u32>().ok()
}
