//! Render instructions
//!
//! An instruction set is the already-resolved output of whatever maps a record onto a
//! template: "write value V at address A on sheet S", plus repeating row blocks anchored
//! at a top-left address.

use crate::cell::{Address, ScalarValue};
use crate::{MAX_COLS, MAX_ROWS};

/// Write one value at a fixed address
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarWrite {
    /// Sheet display name
    pub sheet: String,
    /// A1-style address
    pub address: String,
    /// Value to write
    pub value: ScalarValue,
}

/// One field of a repeating-block item, relative to the block's anchor column
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockField {
    /// Offset from the anchor column (0 = anchor column)
    pub column_offset: u32,
    /// Value to write
    pub value: ScalarValue,
}

/// One record of a repeating block; rendered as one row
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockItem {
    /// Fields of this record
    pub fields: Vec<BlockField>,
}

impl BlockItem {
    /// Create an item from `(column_offset, value)` pairs
    pub fn new<I, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (u32, V)>,
        V: Into<ScalarValue>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(column_offset, value)| BlockField {
                    column_offset,
                    value: value.into(),
                })
                .collect(),
        }
    }
}

/// A variable-length sequence of records rendered as consecutive rows
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepeatingBlock {
    /// Sheet display name
    pub sheet: String,
    /// A1-style address of the block's top-left cell
    pub anchor: String,
    /// Records, one per row
    pub items: Vec<BlockItem>,
}

impl RepeatingBlock {
    /// Anchor as an [`Address`] (tolerant parse)
    pub fn anchor_address(&self) -> Address {
        Address::parse(&self.anchor)
    }

    /// Every `(address, value)` the block writes once its rows are inserted.
    ///
    /// Item `i`, field at offset `k` lands on `(anchor.row + i, anchor.column + k)`.
    /// Cells that would fall past the last row or column are skipped rather than
    /// clamped onto the sheet edge.
    pub fn cells(&self) -> impl Iterator<Item = (Address, &ScalarValue)> + '_ {
        let anchor = self.anchor_address();
        self.items.iter().enumerate().flat_map(move |(i, item)| {
            item.fields.iter().filter_map(move |field| {
                let row = anchor.row() as u64 + i as u64;
                let column = anchor.column() as u64 + field.column_offset as u64;
                if row > MAX_ROWS as u64 || column > MAX_COLS as u64 {
                    return None;
                }
                Some((Address::new(row as i64, column as i64), &field.value))
            })
        })
    }

    /// Number of items that fit between the anchor row and the last sheet row
    pub fn rows_that_fit(&self) -> u32 {
        let available = MAX_ROWS - self.anchor_address().row() + 1;
        u32::try_from(self.items.len()).map_or(available, |n| n.min(available))
    }
}

/// A single render instruction
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Instruction {
    /// Fixed-position write
    Scalar(ScalarWrite),
    /// Repeating row block
    Block(RepeatingBlock),
}

impl Instruction {
    /// Create a scalar instruction
    pub fn scalar<S, A, V>(sheet: S, address: A, value: V) -> Self
    where
        S: Into<String>,
        A: Into<String>,
        V: Into<ScalarValue>,
    {
        Instruction::Scalar(ScalarWrite {
            sheet: sheet.into(),
            address: address.into(),
            value: value.into(),
        })
    }

    /// Create a repeating-block instruction
    pub fn block<S, A>(sheet: S, anchor: A, items: Vec<BlockItem>) -> Self
    where
        S: Into<String>,
        A: Into<String>,
    {
        Instruction::Block(RepeatingBlock {
            sheet: sheet.into(),
            anchor: anchor.into(),
            items,
        })
    }

    /// Sheet display name this instruction targets
    pub fn sheet(&self) -> &str {
        match self {
            Instruction::Scalar(w) => &w.sheet,
            Instruction::Block(b) => &b.sheet,
        }
    }
}

/// All instructions that target one sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetInstructions<'a> {
    /// Sheet display name
    pub sheet: &'a str,
    /// Scalar writes, in input order
    pub scalars: Vec<&'a ScalarWrite>,
    /// Repeating blocks, in input order
    pub blocks: Vec<&'a RepeatingBlock>,
}

impl<'a> SheetInstructions<'a> {
    /// Blocks ordered bottom-up by anchor row (stable for equal rows).
    ///
    /// Inserting rows for a lower block never moves the anchor of a block above it.
    pub fn blocks_bottom_up(&self) -> Vec<&'a RepeatingBlock> {
        let mut blocks = self.blocks.clone();
        blocks.sort_by_key(|b| std::cmp::Reverse(b.anchor_address().row()));
        blocks
    }
}

/// Group instructions by sheet, keeping sheets in order of first appearance
pub fn group_by_sheet(instructions: &[Instruction]) -> Vec<SheetInstructions<'_>> {
    let mut groups: Vec<SheetInstructions<'_>> = Vec::new();

    for instruction in instructions {
        let idx = match groups.iter().position(|g| g.sheet == instruction.sheet()) {
            Some(idx) => idx,
            None => {
                groups.push(SheetInstructions {
                    sheet: instruction.sheet(),
                    ..Default::default()
                });
                groups.len() - 1
            }
        };

        match instruction {
            Instruction::Scalar(w) => groups[idx].scalars.push(w),
            Instruction::Block(b) => groups[idx].blocks.push(b),
        }
    }

    groups
}
