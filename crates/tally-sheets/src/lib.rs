//! # tally-sheets
//!
//! Fill XLSX templates in place.
//!
//! A template is an ordinary workbook with styled cells waiting for data. Callers
//! describe what goes where as a list of [`Instruction`]s: single values written at
//! fixed addresses, and repeating blocks that open one row per item below an anchor
//! (copying the anchor row's formatting) before writing each item's fields.
//! Everything the instructions do not touch is written back unchanged.
//!
//! ## Features
//!
//! - Text stored through the workbook's shared-string table (deduplicated)
//! - Integers, floats, booleans, dates, times and date-times in Excel's native encoding
//! - Row insertion that renumbers every row and cell below the insertion point
//! - Per-sheet failure reporting: one broken sheet never blocks the others
//! - JSON instruction sets (`json` feature, on by default)
//!
//! ## Example
//!
//! ```rust,no_run
//! use tally_sheets::prelude::*;
//!
//! let mut template = Template::open("invoice-template.xlsx").unwrap();
//!
//! let instructions = vec![
//!     Instruction::scalar("Invoice", "B2", "A1000"),
//!     Instruction::scalar("Invoice", "B3", chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
//!     Instruction::block(
//!         "Invoice",
//!         "A10",
//!         vec![
//!             BlockItem::new([(0, ScalarValue::from("Bolt")), (2, ScalarValue::from(12))]),
//!             BlockItem::new([(0, ScalarValue::from("Nut")), (2, ScalarValue::from(40))]),
//!         ],
//!     ),
//! ];
//!
//! let report = template.render(&instructions).unwrap();
//! assert!(report.is_complete());
//! template.save("invoice.xlsx").unwrap();
//! ```

pub mod error;
pub mod prelude;
pub mod render;
pub mod report;
pub mod template;

pub use error::{Error, Result};
pub use render::RenderPipeline;
pub use report::{FailureKind, RenderReport, SheetFailure};
pub use template::Template;

/// Decode a JSON instruction array (`[{"kind": "scalar", ...}, {"kind": "block", ...}]`)
#[cfg(feature = "json")]
pub fn instructions_from_json(json: &str) -> Result<Vec<Instruction>> {
    Ok(serde_json::from_str(json)?)
}

// Re-export core types
pub use tally_sheets_core::{
    date_serial, date_time_serial, group_by_sheet, time_serial, Address, BlockField, BlockItem,
    CellValue, Instruction, RepeatingBlock, ScalarValue, ScalarWrite, SheetInstructions,
    MAX_COLS, MAX_ROWS,
};

// Re-export storage types
pub use tally_sheets_xlsx::{
    Package, SharedStringTable, SheetEntry, SheetMap, WorksheetDocument, XlsxError, XlsxResult,
};
