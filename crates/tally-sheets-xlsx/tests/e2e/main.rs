//! End-to-end tests for tally-sheets-xlsx.
//!
//! Each test builds a small template archive in memory (see [`common`]), opens it as a
//! [`tally_sheets_xlsx::Package`], edits parts and reads the re-archived result back.

mod common;
mod editing;

pub use common::*;
