//! Error types for the template facade

use thiserror::Error;

/// Result type for template operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`Template`](crate::Template)
#[derive(Debug, Error)]
pub enum Error {
    /// Package-level failure (unreadable archive, missing workbook, ...)
    #[error(transparent)]
    Xlsx(#[from] tally_sheets_xlsx::XlsxError),

    /// The template has already been rendered
    #[error("template has already been rendered")]
    AlreadyRendered,

    /// Instruction JSON could not be decoded
    #[cfg(feature = "json")]
    #[error("invalid instructions: {0}")]
    Instructions(#[from] serde_json::Error),
}
