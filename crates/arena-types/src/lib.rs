//! arena-types: Shared data structures for arena ticket-pricing reconciliation.
//!
//! This crate defines all shared types used across the workspace including:
//! - [`SeatCategory`] - The four seat categories of an arena
//! - [`ArenaEvent`] - A classified row of the attendance table (game or price change)
//! - [`EventSequence`] - The parsed rows of one table, ordered by table position
//! - [`PricingPeriod`] - A run of rows sharing one [`PriceSnapshot`]
//! - [`GameRecord`] - A stored game as seen by reconciliation
//! - [`ReconciliationReport`] / [`BatchReport`] - Results handed back to callers
//!
//! # Example
//!
//! ```rust
//! use arena_types::{PriceSnapshot, SeatCategory};
//! use rust_decimal_macros::dec;
//!
//! let prices = PriceSnapshot::new()
//!     .with_price(SeatCategory::Bleachers, dec!(12))
//!     .with_price(SeatCategory::LowerTier, dec!(30));
//!
//! assert_eq!(prices.get(SeatCategory::Bleachers), Some(dec!(12)));
//! assert!(!prices.is_complete());
//! ```

mod error;
mod event;
mod game;
mod period;
mod prices;
mod report;
mod seat;

pub use error::TypeError;
pub use event::{ArenaEvent, EventSequence, GameEvent, PriceChange};
pub use game::GameRecord;
pub use period::{PeriodBoundary, PricingPeriod};
pub use prices::{PeriodPrices, PriceSnapshot};
pub use report::{
    format_utc_offset, BatchReport, Diagnostic, DiagnosticLevel, DiagnosticStage, PeriodDetail,
    ReconciliationReport, ReportStatus, TeamError, TimezoneDetection,
};
pub use seat::SeatCategory;
