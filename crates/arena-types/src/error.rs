//! Error types for arena-types.

use thiserror::Error;

/// Errors that can occur when working with types.
#[derive(Debug, Error)]
pub enum TypeError {
    /// Unknown seat category name or header label.
    #[error("invalid seat category: {0}")]
    InvalidSeatCategory(String),

    /// Events handed to an [`EventSequence`](crate::EventSequence) were not
    /// in strictly increasing row order.
    #[error("row index {current} does not follow {previous}")]
    RowOrder { previous: usize, current: usize },

    /// An event sits at or beyond the declared row count.
    #[error("row index {index} outside table of {row_count} rows")]
    RowOutOfRange { index: usize, row_count: usize },
}
