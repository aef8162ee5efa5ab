//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Address`] - A cell's location (e.g., "C10")
//! - [`ScalarValue`] - A caller-supplied value
//! - [`CellValue`] - The encoded form a worksheet cell stores
//! - date serial conversions for the 1900 date system

mod address;
pub mod serial;
mod value;

pub use address::Address;
pub use value::{CellValue, ScalarValue};
