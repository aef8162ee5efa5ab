//! Error types for tally-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tally-sheets-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row number outside 1..=MAX_ROWS
    #[error("Row {0} out of bounds (max: {1})")]
    RowOutOfBounds(u64, u32),

    /// Column number outside 1..=MAX_COLS
    #[error("Column {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u64, u32),
}
