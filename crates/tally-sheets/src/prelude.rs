//! Prelude module - common imports for tally-sheets users
//!
//! ```rust
//! use tally_sheets::prelude::*;
//! ```

pub use crate::{
    // Cell types
    Address,
    BlockItem,
    // Error types
    Error,
    FailureKind,
    // Instructions
    Instruction,
    RenderReport,
    Result,
    ScalarValue,
    SheetFailure,
    SheetMap,
    // Main types
    Template,
};
