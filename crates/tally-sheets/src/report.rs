//! Outcome of one render pass

use tally_sheets_xlsx::XlsxError;
use thiserror::Error;

/// Why a sheet could not be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The worksheet part does not exist in the package
    MissingPart,
    /// The worksheet part exists but is not well-formed worksheet XML
    Malformed,
    /// Reading or writing the part failed
    Io,
}

impl From<&XlsxError> for FailureKind {
    fn from(err: &XlsxError) -> Self {
        match err {
            XlsxError::MissingPart(_) => FailureKind::MissingPart,
            XlsxError::Io(_) | XlsxError::Zip(_) => FailureKind::Io,
            _ => FailureKind::Malformed,
        }
    }
}

/// A sheet whose render was abandoned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sheet '{sheet}' ({part}): {message}")]
pub struct SheetFailure {
    /// Display name of the sheet
    pub sheet: String,
    /// Worksheet part path
    pub part: String,
    /// Failure category
    pub kind: FailureKind,
    /// Underlying error text
    pub message: String,
}

impl SheetFailure {
    pub(crate) fn new(sheet: &str, part: &str, err: &XlsxError) -> Self {
        Self {
            sheet: sheet.to_string(),
            part: part.to_string(),
            kind: FailureKind::from(err),
            message: err.to_string(),
        }
    }
}

/// Per-sheet results of a render pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Sheets written successfully, in the order they were rendered
    pub sheets_rendered: Vec<String>,
    /// Sheets that failed; other sheets were still rendered
    pub failures: Vec<SheetFailure>,
    /// Sheet names with no matching worksheet (their instructions were dropped)
    pub unknown_sheets: Vec<String>,
    /// The shared-string part had to be created and registered
    pub shared_strings_created: bool,
}

impl RenderReport {
    /// Check if every known sheet rendered
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
