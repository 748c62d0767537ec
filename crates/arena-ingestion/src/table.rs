//! Locating the attendance table inside an arena page.
//!
//! [`TableIsolator::isolate`] finds the table and splits its rows into the
//! header row and data rows. Data rows keep document order, which is the
//! table position every later stage relies on.
//!
//! `scraper::Html` is not `Send`, so an [`AttendanceTable`] borrows the
//! document and must be consumed before any `.await`.

use crate::config::{TableLayout, EXPECTED_HEADERS};
use crate::error::IngestionError;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// The attendance table of one parsed document.
#[derive(Debug, Clone)]
pub struct AttendanceTable<'a> {
    element: ElementRef<'a>,
    header: Option<ElementRef<'a>>,
    data_rows: Vec<ElementRef<'a>>,
}

impl<'a> AttendanceTable<'a> {
    /// The `<table>` element itself.
    pub fn element(&self) -> ElementRef<'a> {
        self.element
    }

    pub fn header(&self) -> Option<ElementRef<'a>> {
        self.header
    }

    /// Data rows in table order. Index in this slice is the row's table
    /// position.
    pub fn data_rows(&self) -> &[ElementRef<'a>] {
        &self.data_rows
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.data_rows.len()
    }
}

/// Structural summary of an attendance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStructure {
    pub header_present: bool,

    /// Header cell texts, trimmed.
    pub headers: Vec<String>,

    /// Whether `headers` equals the expected column labels.
    pub headers_match: bool,

    pub data_row_count: usize,

    /// Positions of data rows with fewer than the minimum column count.
    pub short_rows: Vec<usize>,
}

impl TableStructure {
    /// Header present and no short rows.
    pub fn is_valid(&self) -> bool {
        self.header_present && self.short_rows.is_empty()
    }
}

/// Finds and validates the attendance table.
#[derive(Debug, Clone)]
pub struct TableIsolator {
    layout: TableLayout,
    table_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
    header_cell_sel: Selector,
}

impl TableIsolator {
    /// Create an isolator for a table layout.
    ///
    /// # Errors
    ///
    /// [`IngestionError::InvalidSelector`] if the layout's table id does not
    /// form a valid CSS selector.
    pub fn new(layout: TableLayout) -> Result<Self, IngestionError> {
        Ok(Self {
            table_sel: parse_selector(&layout.table_selector())?,
            row_sel: parse_selector("tr")?,
            cell_sel: parse_selector("td")?,
            header_cell_sel: parse_selector("th")?,
            layout,
        })
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Locate the attendance table in a parsed document.
    ///
    /// Every `<tr>` without the header class is a data row, including rows
    /// that turn out to be malformed, so positions match what the page shows.
    ///
    /// # Errors
    ///
    /// [`IngestionError::TableNotFound`] if no element matches the table
    /// selector.
    pub fn isolate<'a>(&self, document: &'a Html) -> Result<AttendanceTable<'a>, IngestionError> {
        let element = document
            .select(&self.table_sel)
            .next()
            .ok_or_else(|| IngestionError::TableNotFound(self.layout.table_selector()))?;

        let mut header = None;
        let mut data_rows = Vec::new();
        for row in element.select(&self.row_sel) {
            if self.is_header_row(&row) {
                header.get_or_insert(row);
            } else {
                data_rows.push(row);
            }
        }

        tracing::debug!(
            "isolated attendance table: header={} data_rows={}",
            header.is_some(),
            data_rows.len()
        );

        Ok(AttendanceTable {
            element,
            header,
            data_rows,
        })
    }

    fn is_header_row(&self, row: &ElementRef<'_>) -> bool {
        row.value().classes().any(|c| c == self.layout.header_class)
    }

    /// Cells of a data row, in column order.
    pub fn cells<'a>(&self, row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
        row.select(&self.cell_sel).collect()
    }

    /// True if the header row is present and every data row has at least
    /// the minimum column count.
    ///
    /// Never fails; callers decide whether a best-effort parse is worth it.
    pub fn validate_table_structure(&self, table: &AttendanceTable<'_>) -> bool {
        self.inspect_structure(table).is_valid()
    }

    /// Detailed structure check behind [`validate_table_structure`](Self::validate_table_structure).
    pub fn inspect_structure(&self, table: &AttendanceTable<'_>) -> TableStructure {
        let headers: Vec<String> = table
            .header
            .map(|h| h.select(&self.header_cell_sel).map(|th| cell_text(&th)).collect())
            .unwrap_or_default();

        let headers_match = headers.len() == EXPECTED_HEADERS.len()
            && headers.iter().zip(EXPECTED_HEADERS).all(|(a, b)| a == b);

        let short_rows = table
            .data_rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.select(&self.cell_sel).count() < self.layout.min_columns)
            .map(|(i, _)| i)
            .collect();

        TableStructure {
            header_present: table.header.is_some(),
            headers,
            headers_match,
            data_row_count: table.data_rows.len(),
            short_rows,
        }
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, IngestionError> {
    Selector::parse(selector).map_err(|e| IngestionError::InvalidSelector(format!("{selector}: {e}")))
}

/// Text content of an element with whitespace runs collapsed.
pub(crate) fn cell_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table id="other"><tr><td>noise</td></tr></table>
        <table id="cphContent_seatingStats">
          <tr class="tableHeader">
            <th>Date</th><th>Opponent</th><th>Bleachers</th><th>Lower Tier</th>
            <th>Courtside Seats</th><th>Luxury Boxes</th><th>Total Attendance</th><th>Game Type</th>
          </tr>
          <tr><td><a href="/match/1/boxscore.aspx">7/6/2025</a></td><td>A</td><td>1</td><td>2</td><td>3</td><td>4</td><td>10</td><td>League</td></tr>
          <tr><td>7/5/2025</td></tr>
          <tr><td>7/1/2025</td><td>Ticket Price Update</td><td>$10</td><td>$25</td><td>$60</td><td>$500</td><td>-1</td><td></td></tr>
        </table>
        </body></html>"#;

    fn isolator() -> TableIsolator {
        TableIsolator::new(TableLayout::default()).unwrap()
    }

    #[test]
    fn test_isolate_finds_table_and_rows() {
        let doc = Html::parse_document(PAGE);
        let iso = isolator();
        let table = iso.isolate(&doc).unwrap();
        assert!(table.header().is_some());
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.element().value().id(), Some("cphContent_seatingStats"));
    }

    #[test]
    fn test_isolate_missing_table() {
        let doc = Html::parse_document("<html><body><table id=\"x\"></table></body></html>");
        let err = isolator().isolate(&doc).unwrap_err();
        assert!(matches!(err, IngestionError::TableNotFound(_)));
    }

    #[test]
    fn test_inspect_reports_short_rows() {
        let doc = Html::parse_document(PAGE);
        let iso = isolator();
        let table = iso.isolate(&doc).unwrap();
        let structure = iso.inspect_structure(&table);
        assert!(structure.header_present);
        assert!(structure.headers_match);
        assert_eq!(structure.short_rows, vec![1]);
        assert!(!iso.validate_table_structure(&table));
    }

    #[test]
    fn test_validate_without_header() {
        let doc = Html::parse_document(
            r#"<table id="cphContent_seatingStats">
                 <tr><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td><td>6</td><td>7</td><td>8</td></tr>
               </table>"#,
        );
        let iso = isolator();
        let table = iso.isolate(&doc).unwrap();
        assert!(!iso.validate_table_structure(&table));
        assert!(!iso.inspect_structure(&table).header_present);
    }

    #[test]
    fn test_validate_well_formed() {
        let doc = Html::parse_document(
            r#"<table id="cphContent_seatingStats">
                 <tr class="tableHeader"><th>Date</th></tr>
                 <tr><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td><td>6</td><td>7</td><td>8</td></tr>
               </table>"#,
        );
        let iso = isolator();
        let table = iso.isolate(&doc).unwrap();
        assert!(iso.validate_table_structure(&table));
        assert!(!iso.inspect_structure(&table).headers_match);
    }

    #[test]
    fn test_cell_text_collapses_whitespace() {
        let doc = Html::parse_fragment("<p>  Ticket \n  Price   Update </p>");
        let sel = Selector::parse("p").unwrap();
        let p = doc.select(&sel).next().unwrap();
        assert_eq!(cell_text(&p), "Ticket Price Update");
    }
}
