//! Worksheet part (`xl/worksheets/sheetN.xml`) as an editable row/cell tree
//!
//! Everything outside `<sheetData>` is kept as captured XML events and written back
//! untouched (apart from the `<dimension>` reference). `<sheetData>` itself is held as
//! an arena: rows sorted by row number, cells within a row sorted by column number.
//! Every cell's address always agrees with the number of the row that holds it.

mod reader;
mod writer;

use quick_xml::events::Event;
use tally_sheets_core::{Address, CellValue, ScalarValue, MAX_ROWS};

use crate::error::XlsxResult;
use crate::package::Package;
use crate::shared_strings::SharedStringTable;
use crate::xml::OwnedAttr;

/// A child element of `<c>`
#[derive(Debug, Clone)]
enum CellChild {
    /// `<v>` text
    Value(String),
    /// Any other child (`<f>`, `<is>`, `<extLst>`), kept verbatim
    Markup {
        local_name: String,
        events: Vec<Event<'static>>,
    },
}

impl CellChild {
    fn is(&self, name: &str) -> bool {
        matches!(self, CellChild::Markup { local_name, .. } if local_name == name)
    }
}

/// One `<c>` element
#[derive(Debug, Clone)]
pub struct CellNode {
    address: Address,
    /// `t` attribute
    cell_type: Option<String>,
    /// Attributes other than `r` and `t` (style index etc.)
    attrs: Vec<OwnedAttr>,
    children: Vec<CellChild>,
}

impl CellNode {
    fn new(address: Address) -> Self {
        Self {
            address,
            cell_type: None,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Same attributes (style etc.), no type tag, no content
    fn blank(&self) -> Self {
        Self {
            address: self.address,
            cell_type: None,
            attrs: self.attrs.clone(),
            children: Vec::new(),
        }
    }

    /// Cell address
    pub fn address(&self) -> Address {
        self.address
    }

    /// A1-style reference written in the `r` attribute
    pub fn reference(&self) -> String {
        self.address.to_reference()
    }

    /// The `t` attribute, if any
    pub fn cell_type(&self) -> Option<&str> {
        self.cell_type.as_deref()
    }

    /// Text of the `<v>` child, if any
    pub fn value_text(&self) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            CellChild::Value(v) => Some(v.as_str()),
            CellChild::Markup { .. } => None,
        })
    }

    /// Check for a formula child
    pub fn has_formula(&self) -> bool {
        self.children.iter().any(|child| child.is("f"))
    }

    /// Look up another attribute (e.g. `s` for the style index)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the cell's content with an encoded value.
    ///
    /// The type tag follows the value (numeric values clear it), an inline string is
    /// dropped, and an empty value removes `<v>` altogether. Style and formula stay.
    pub fn set_value(&mut self, value: CellValue) {
        self.cell_type = value.type_tag().map(str::to_string);
        self.children.retain(|child| !child.is("is"));

        let existing = self
            .children
            .iter()
            .position(|child| matches!(child, CellChild::Value(_)));

        match (value.text(), existing) {
            (Some(text), Some(idx)) => self.children[idx] = CellChild::Value(text),
            (Some(text), None) => {
                let idx = self
                    .children
                    .iter()
                    .position(|child| !child.is("f"))
                    .unwrap_or(self.children.len());
                self.children.insert(idx, CellChild::Value(text));
            }
            (None, Some(idx)) => {
                self.children.remove(idx);
            }
            (None, None) => {}
        }
    }
}

/// One `<row>` element
#[derive(Debug, Clone)]
pub struct RowNode {
    number: u32,
    /// Attributes other than `r`
    attrs: Vec<OwnedAttr>,
    cells: Vec<CellNode>,
    /// Non-`<c>` children, kept verbatim after the cells
    extras: Vec<Event<'static>>,
}

impl RowNode {
    fn new(number: u32) -> Self {
        Self {
            number,
            attrs: Vec::new(),
            cells: Vec::new(),
            extras: Vec::new(),
        }
    }

    /// Row number (1-based)
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Cells in column order
    pub fn cells(&self) -> &[CellNode] {
        &self.cells
    }

    /// Cell at a column number
    pub fn cell(&self, column: u32) -> Option<&CellNode> {
        self.cells.iter().find(|c| c.address.column() == column)
    }

    /// Look up a row attribute (e.g. `ht`, `s`)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Renumber the row and every cell in it; columns are unchanged
    fn shift_to(&mut self, number: u32) {
        self.number = number;
        for cell in &mut self.cells {
            cell.address = cell.address.with_row(number as i64);
        }
    }

    /// A copy of this row's structure at another row number, without cell content
    fn blank_copy_at(&self, number: u32) -> Self {
        let mut row = Self {
            number,
            attrs: self.attrs.clone(),
            cells: self.cells.iter().map(CellNode::blank).collect(),
            extras: Vec::new(),
        };
        row.shift_to(number);
        row
    }

    fn get_or_create_cell(&mut self, column: u32) -> &mut CellNode {
        // Compare true column numbers: "AA" sorts before "B" as text but not as a column.
        let idx = match self.cells.iter().position(|c| c.address.column() >= column) {
            Some(idx) if self.cells[idx].address.column() == column => idx,
            Some(idx) => {
                let address = Address::new(self.number as i64, column as i64);
                self.cells.insert(idx, CellNode::new(address));
                idx
            }
            None => {
                let address = Address::new(self.number as i64, column as i64);
                self.cells.push(CellNode::new(address));
                self.cells.len() - 1
            }
        };
        &mut self.cells[idx]
    }
}

/// An editable worksheet part
#[derive(Debug, Clone)]
pub struct WorksheetDocument {
    part_name: String,
    /// Namespace prefix used by `<sheetData>` ("" or e.g. "x:")
    prefix: String,
    /// Events up to and including the `<sheetData>` start tag
    head: Vec<Event<'static>>,
    rows: Vec<RowNode>,
    /// The `</sheetData>` end tag and everything after it
    tail: Vec<Event<'static>>,
}

impl WorksheetDocument {
    /// Load a worksheet part from the package.
    ///
    /// Fails with [`XlsxError::MissingPart`](crate::XlsxError::MissingPart) when the part
    /// does not exist, or with an XML/parse error when it cannot be read.
    pub fn open(package: &Package, part_name: &str) -> XlsxResult<Self> {
        let bytes = package.require(part_name)?;
        Self::parse(part_name, bytes)
    }

    /// Parse worksheet XML
    pub fn parse(part_name: &str, bytes: &[u8]) -> XlsxResult<Self> {
        reader::parse_worksheet(part_name, bytes)
    }

    /// Part name this document was loaded from
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Rows in ascending row order
    pub fn rows(&self) -> &[RowNode] {
        &self.rows
    }

    /// Row by number
    pub fn row(&self, number: u32) -> Option<&RowNode> {
        self.rows
            .binary_search_by_key(&number, |r| r.number)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Cell by address
    pub fn cell(&self, address: Address) -> Option<&CellNode> {
        self.row(address.row())
            .and_then(|row| row.cell(address.column()))
    }

    /// Find a row, creating an empty one in sorted position if absent
    pub fn get_or_create_row(&mut self, number: u32) -> &mut RowNode {
        let idx = match self.rows.binary_search_by_key(&number, |r| r.number) {
            Ok(idx) => idx,
            Err(idx) => {
                self.rows.insert(idx, RowNode::new(number));
                idx
            }
        };
        &mut self.rows[idx]
    }

    /// Find a cell, creating its row and the cell itself in sorted position if absent
    pub fn get_or_create_cell(&mut self, address: Address) -> &mut CellNode {
        self.get_or_create_row(address.row())
            .get_or_create_cell(address.column())
    }

    /// Write an encoded value into a cell
    pub fn set_cell_value(&mut self, address: Address, value: CellValue) {
        self.get_or_create_cell(address).set_value(value);
    }

    /// Write a caller value into a cell, adding text to the shared-string table
    pub fn set_value(
        &mut self,
        address: Address,
        value: &ScalarValue,
        strings: &mut SharedStringTable,
    ) {
        let encoded = value.encode(|text| strings.add(text));
        if encoded.is_empty() && !matches!(value, ScalarValue::Text(_)) {
            log::warn!(
                "{}: {} value at {} cannot be stored, clearing the cell",
                self.part_name,
                value.type_name(),
                address
            );
        }
        self.set_cell_value(address, encoded);
    }

    /// Open `count` rows starting at `from`.
    ///
    /// Rows below `from` move down by `count` (cells are renumbered with them). An
    /// existing row at `from` stays in place and serves as the template for the rows
    /// `from + 1 ..` (attributes and cell styles, no content); without one, `count`
    /// fresh empty rows are created starting at `from`.
    pub fn insert_rows(&mut self, from: u32, count: u32) {
        let from = from.clamp(1, MAX_ROWS);
        // New rows never go past the last sheet row
        let count = count.min(MAX_ROWS - from + 1);
        if count == 0 {
            return;
        }

        let template = self
            .rows
            .binary_search_by_key(&from, |r| r.number)
            .ok()
            .map(|idx| self.rows[idx].clone());
        let first_below = self.rows.partition_point(|r| r.number <= from);

        // Rows pushed past the last sheet row are lost
        let keep = first_below
            + self.rows[first_below..].partition_point(|r| r.number + count <= MAX_ROWS);
        if keep < self.rows.len() {
            log::warn!(
                "{}: {} row(s) shifted past row {} were dropped",
                self.part_name,
                self.rows.len() - keep,
                MAX_ROWS
            );
            self.rows.truncate(keep);
        }

        for row in &mut self.rows[first_below..] {
            row.shift_to(row.number + count);
        }

        let (template, start) = match template {
            Some(row) => (row, 1),
            None => (RowNode::new(from), 0),
        };
        let new_rows: Vec<RowNode> = (start..count)
            .map(|i| template.blank_copy_at(from + i))
            .collect();

        log::debug!(
            "{}: inserted {} rows at {} ({} shifted)",
            self.part_name,
            new_rows.len(),
            from,
            self.rows.len() - first_below
        );
        self.rows.splice(first_below..first_below, new_rows);
    }

    /// Smallest range covering every cell (`None` when the sheet has no cells)
    pub fn used_range(&self) -> Option<(Address, Address)> {
        let first_row = self.rows.iter().find(|r| !r.cells.is_empty())?.number;
        let last_row = self.rows.iter().rev().find(|r| !r.cells.is_empty())?.number;
        let columns = self.rows.iter().flat_map(|r| r.cells.iter()).map(|c| c.address.column());
        let first_col = columns.clone().min()?;
        let last_col = columns.max()?;

        Some((
            Address::new(first_row as i64, first_col as i64),
            Address::new(last_row as i64, last_col as i64),
        ))
    }

    /// Serialize the worksheet XML
    pub fn save(&self) -> XlsxResult<Vec<u8>> {
        writer::write_worksheet(self)
    }

    /// Serialize and store the worksheet back into its package part
    pub fn save_into(&self, package: &mut Package) -> XlsxResult<()> {
        package.set_part(self.part_name.as_str(), self.save()?);
        Ok(())
    }
}
