//! Cell addresses
//!
//! Rows and columns are 1-based, exactly as they appear in an A1-style reference.
//! Out-of-range coordinates are clamped into the sheet instead of being rejected.

use std::fmt;
use std::str::FromStr;

use lazy_regex::regex_captures;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A cell coordinate (e.g., "C10" is row 10, column 3)
///
/// Invariant: `1 <= row <= MAX_ROWS` and `1 <= column <= MAX_COLS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    row: u32,
    column: u32,
}

impl Address {
    /// Create an address, clamping both coordinates into the sheet
    pub fn new(row: i64, column: i64) -> Self {
        let mut addr = Self::default();
        addr.set(row, column);
        addr
    }

    /// Parse an A1-style reference.
    ///
    /// Malformed text yields the default address `A1`; oversized coordinates are clamped.
    ///
    /// # Examples
    /// ```
    /// use tally_sheets_core::Address;
    ///
    /// let addr = Address::parse("C10");
    /// assert_eq!(addr.row(), 10);
    /// assert_eq!(addr.column(), 3);
    ///
    /// assert_eq!(Address::parse("not a cell").to_reference(), "A1");
    /// ```
    pub fn parse(text: &str) -> Self {
        match regex_captures!(r"^([A-Z]{1,3})([0-9]+)$"i, text.trim()) {
            Some((_, letters, digits)) => {
                let column = Self::column_name_to_number(letters);
                // Saturate absurdly long row numbers; set_row clamps them anyway.
                let row = digits.parse::<i64>().unwrap_or(i64::MAX);
                Self::new(row, column as i64)
            }
            None => Self::default(),
        }
    }

    /// Parse an A1-style reference, rejecting anything [`Address::parse`] would have
    /// defaulted or clamped.
    pub fn parse_strict(text: &str) -> Result<Self> {
        let (_, letters, digits) = regex_captures!(r"^([A-Z]{1,3})([0-9]+)$"i, text.trim())
            .ok_or_else(|| Error::InvalidAddress(format!("'{}' is not an A1 reference", text)))?;

        let column = Self::column_name_to_number(letters) as u64;
        if column > MAX_COLS as u64 {
            return Err(Error::ColumnOutOfBounds(column, MAX_COLS));
        }

        let row: u64 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", text)))?;
        if row == 0 || row > MAX_ROWS as u64 {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS));
        }

        Ok(Self {
            row: row as u32,
            column: column as u32,
        })
    }

    /// Row number (1-based)
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Column number (1-based, A = 1)
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Column letters (e.g., "C")
    pub fn column_name(&self) -> String {
        Self::number_to_column_name(self.column)
    }

    /// Format as an A1-style reference
    pub fn to_reference(&self) -> String {
        format!("{}{}", self.column_name(), self.row)
    }

    /// Set the row, clamped to `1..=MAX_ROWS`
    pub fn set_row(&mut self, row: i64) -> &mut Self {
        self.row = row.clamp(1, MAX_ROWS as i64) as u32;
        self
    }

    /// Set the column, clamped to `1..=MAX_COLS`
    pub fn set_column(&mut self, column: i64) -> &mut Self {
        self.column = column.clamp(1, MAX_COLS as i64) as u32;
        self
    }

    /// Set both coordinates
    pub fn set(&mut self, row: i64, column: i64) -> &mut Self {
        self.set_row(row).set_column(column)
    }

    /// Move the row by `n` (may be negative)
    pub fn add_row(&mut self, n: i64) -> &mut Self {
        self.set_row(self.row as i64 + n)
    }

    /// Move the column by `n` (may be negative)
    pub fn add_column(&mut self, n: i64) -> &mut Self {
        self.set_column(self.column as i64 + n)
    }

    /// Copy of this address on another row, same column
    pub fn with_row(&self, row: i64) -> Self {
        let mut addr = *self;
        addr.set_row(row);
        addr
    }

    /// Convert column letters to a number (A = 1, Z = 26, AA = 27, ...)
    ///
    /// Letters are case-insensitive; non-letters are ignored.
    pub fn column_name_to_number(name: &str) -> u32 {
        name.bytes()
            .filter(u8::is_ascii_alphabetic)
            .fold(0u32, |acc, b| {
                acc.saturating_mul(26)
                    .saturating_add((b.to_ascii_uppercase() - b'A') as u32 + 1)
            })
    }

    /// Convert a column number to letters (1 = A, 26 = Z, 27 = AA, ...)
    ///
    /// Bijective base-26: there is no zero digit, so each step borrows one before dividing.
    pub fn number_to_column_name(number: u32) -> String {
        let mut letters = Vec::new();
        let mut n = number.max(1);

        while n > 0 {
            n -= 1;
            letters.push(b'A' + (n % 26) as u8);
            n /= 26;
        }

        letters.iter().rev().map(|&b| b as char).collect()
    }
}

impl Default for Address {
    fn default() -> Self {
        Self { row: 1, column: 1 }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_name(), self.row)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_strict(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_number_to_column_name() {
        assert_eq!(Address::number_to_column_name(1), "A");
        assert_eq!(Address::number_to_column_name(2), "B");
        assert_eq!(Address::number_to_column_name(26), "Z");
        assert_eq!(Address::number_to_column_name(27), "AA");
        assert_eq!(Address::number_to_column_name(52), "AZ");
        assert_eq!(Address::number_to_column_name(53), "BA");
        assert_eq!(Address::number_to_column_name(702), "ZZ");
        assert_eq!(Address::number_to_column_name(703), "AAA");
        assert_eq!(Address::number_to_column_name(16384), "XFD");
    }

    #[test]
    fn test_column_name_to_number() {
        assert_eq!(Address::column_name_to_number("A"), 1);
        assert_eq!(Address::column_name_to_number("Z"), 26);
        assert_eq!(Address::column_name_to_number("AA"), 27);
        assert_eq!(Address::column_name_to_number("ZZ"), 702);
        assert_eq!(Address::column_name_to_number("AAA"), 703);
        assert_eq!(Address::column_name_to_number("XFD"), 16384);

        // Case insensitive
        assert_eq!(Address::column_name_to_number("xfd"), 16384);
    }

    #[test]
    fn test_parse() {
        let addr = Address::parse("C10");
        assert_eq!((addr.row(), addr.column()), (10, 3));
        assert_eq!(addr.column_name(), "C");

        let addr = Address::parse("xfd1048576");
        assert_eq!((addr.row(), addr.column()), (1_048_576, 16_384));
        assert_eq!(addr.to_reference(), "XFD1048576");
    }

    #[test]
    fn test_parse_malformed_defaults_to_a1() {
        for text in ["", "A", "10", "$A$1", "ABCD1", "A1:B2", "1A", "Sheet1!A1", "A\u{661}"] {
            assert_eq!(Address::parse(text), Address::default(), "{text:?}");
        }
        // Row digits must be ASCII
        assert!(Address::parse_strict("A\u{661}").is_err());
    }

    #[test]
    fn test_parse_clamps() {
        assert_eq!(Address::parse("A0").to_reference(), "A1");
        assert_eq!(Address::parse("A99999999").to_reference(), "A1048576");
        assert_eq!(Address::parse("ZZZ5").to_reference(), "XFD5");
    }

    #[test]
    fn test_parse_strict() {
        assert_eq!(Address::parse_strict("B2").unwrap(), Address::new(2, 2));
        assert!(Address::parse_strict("").is_err());
        assert!(Address::parse_strict("A0").is_err());
        assert!(Address::parse_strict("A1048577").is_err());
        assert!(Address::parse_strict("XFE1").is_err());
        assert!("C3".parse::<Address>().is_ok());
    }

    #[test]
    fn test_clamping() {
        let mut addr = Address::default();
        assert_eq!(addr.set_row(0).row(), 1);
        assert_eq!(addr.set_row(2_000_000).row(), 1_048_576);
        assert_eq!(addr.set_column(0).column(), 1);
        assert_eq!(addr.set_column(20_000).column(), 16_384);
        assert_eq!(addr.set_column(-5).column(), 1);
    }

    #[test]
    fn test_relative_moves() {
        let mut addr = Address::parse("C10");
        addr.add_row(2).add_column(1);
        assert_eq!(addr.to_string(), "D12");

        addr.add_row(-100);
        assert_eq!(addr.row(), 1);

        assert_eq!(Address::parse("E4").with_row(9).to_reference(), "E9");
    }

    #[test]
    fn test_every_column_round_trips() {
        for n in 1..=MAX_COLS {
            let name = Address::number_to_column_name(n);
            assert_eq!(Address::column_name_to_number(&name), n, "{name}");
        }
    }

    proptest! {
        #[test]
        fn prop_reference_round_trip(row in 1u32..=MAX_ROWS, column in 1u32..=MAX_COLS) {
            let addr = Address::new(row as i64, column as i64);
            prop_assert_eq!(Address::parse(&addr.to_reference()), addr);
        }

        #[test]
        fn prop_clamped_into_sheet(row in any::<i64>(), column in any::<i64>()) {
            let addr = Address::new(row, column);
            prop_assert!((1..=MAX_ROWS).contains(&addr.row()));
            prop_assert!((1..=MAX_COLS).contains(&addr.column()));
        }
    }
}
