//! # tally-sheets-core
//!
//! Core types for the tally-sheets template renderer.
//!
//! This crate provides the pieces that do not touch storage:
//! - [`Address`] - A1-style cell coordinates with clamping
//! - [`ScalarValue`] and [`CellValue`] - caller values and their cell encoding
//! - [`Instruction`] - the resolved "write V at A on sheet S" instruction set
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_core::{group_by_sheet, BlockItem, Instruction};
//!
//! let instructions = vec![
//!     Instruction::scalar("Sheet1", "A1", "Invoice"),
//!     Instruction::block("Sheet1", "C10", vec![BlockItem::new([(0, "X"), (1, "Y")])]),
//! ];
//!
//! let groups = group_by_sheet(&instructions);
//! assert_eq!(groups[0].scalars.len(), 1);
//! assert_eq!(groups[0].blocks.len(), 1);
//! ```

pub mod cell;
pub mod error;
pub mod instruction;

// Re-exports for convenience
pub use cell::serial::{date_serial, date_time_serial, time_serial};
pub use cell::{Address, CellValue, ScalarValue};
pub use error::{Error, Result};
pub use instruction::{
    group_by_sheet, BlockField, BlockItem, Instruction, RepeatingBlock, ScalarWrite,
    SheetInstructions,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
