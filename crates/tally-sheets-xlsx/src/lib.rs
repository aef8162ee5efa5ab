//! # tally-sheets-xlsx
//!
//! In-place editing of XLSX (Office Open XML) template packages.
//!
//! A [`Package`] holds every part of the archive in memory. Worksheet parts are edited
//! through [`WorksheetDocument`], text goes through one [`SharedStringTable`] per
//! package, and [`SheetMap`] resolves the sheet display names used by callers.
//! Parts that are not touched are written back byte for byte.

pub mod error;
pub mod namespaces;
pub mod package;
pub mod registry;
pub mod shared_strings;
pub mod workbook;
pub mod worksheet;

mod xml;

pub use error::{XlsxError, XlsxResult};
pub use package::Package;
pub use registry::{register_shared_strings, Registration};
pub use shared_strings::SharedStringTable;
pub use workbook::{SheetEntry, SheetMap};
pub use worksheet::{CellNode, RowNode, WorksheetDocument};
