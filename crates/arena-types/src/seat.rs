//! Seat categories of a BuzzerBeater arena.
//!
//! Every arena sells the same four kinds of seats. The attendance table uses
//! a display label per category as its column header, while stored records
//! and reports use a stable snake_case name.
//!
//! # Example
//!
//! ```rust
//! use arena_types::SeatCategory;
//!
//! let seat = SeatCategory::from_name("Courtside Seats").unwrap();
//! assert_eq!(seat, SeatCategory::Courtside);
//! assert_eq!(seat.name(), "courtside");
//! ```

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four seat categories sold in an arena.
///
/// Variants are ordered the way the attendance table lays out its columns,
/// so [`SeatCategory::ALL`] doubles as the column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatCategory {
    Bleachers,
    LowerTier,
    Courtside,
    LuxuryBoxes,
}

impl SeatCategory {
    /// All categories in table column order.
    pub const ALL: [SeatCategory; 4] = [
        SeatCategory::Bleachers,
        SeatCategory::LowerTier,
        SeatCategory::Courtside,
        SeatCategory::LuxuryBoxes,
    ];

    /// Parse a category from its snake_case name or its table header label.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_name(name: &str) -> Result<Self, TypeError> {
        match name.trim().to_lowercase().as_str() {
            "bleachers" => Ok(SeatCategory::Bleachers),
            "lower_tier" | "lower tier" => Ok(SeatCategory::LowerTier),
            "courtside" | "courtside seats" => Ok(SeatCategory::Courtside),
            "luxury_boxes" | "luxury boxes" => Ok(SeatCategory::LuxuryBoxes),
            _ => Err(TypeError::InvalidSeatCategory(name.to_string())),
        }
    }

    /// Stable snake_case name used in stored records and reports.
    pub fn name(&self) -> &'static str {
        match self {
            SeatCategory::Bleachers => "bleachers",
            SeatCategory::LowerTier => "lower_tier",
            SeatCategory::Courtside => "courtside",
            SeatCategory::LuxuryBoxes => "luxury_boxes",
        }
    }

    /// Column header label as printed in the attendance table.
    pub fn header_label(&self) -> &'static str {
        match self {
            SeatCategory::Bleachers => "Bleachers",
            SeatCategory::LowerTier => "Lower Tier",
            SeatCategory::Courtside => "Courtside Seats",
            SeatCategory::LuxuryBoxes => "Luxury Boxes",
        }
    }

    /// Zero-based position of this category among the seat columns.
    #[inline]
    pub fn column_offset(&self) -> usize {
        match self {
            SeatCategory::Bleachers => 0,
            SeatCategory::LowerTier => 1,
            SeatCategory::Courtside => 2,
            SeatCategory::LuxuryBoxes => 3,
        }
    }
}

impl fmt::Display for SeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SeatCategory {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeatCategory::from_name(s)
    }
}
