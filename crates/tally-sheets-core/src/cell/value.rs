//! Cell value types

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::serial::{date_serial, date_time_serial, time_serial};

/// A value supplied by the caller for one cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScalarValue {
    /// UTF-8 text, stored through the shared-string table
    Text(String),
    /// 64-bit signed integer
    Integer(i64),
    /// Double-precision float
    Float(f64),
    /// Boolean (TRUE/FALSE)
    Boolean(bool),
    /// Calendar date, stored as a date serial
    Date(NaiveDate),
    /// Time of day, stored as a fraction of a day
    Time(NaiveTime),
    /// Date and time, stored as date serial plus day fraction
    DateTime(NaiveDateTime),
}

impl ScalarValue {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        ScalarValue::Text(s.into())
    }

    /// Get the type name for log messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Text(_) => "text",
            ScalarValue::Integer(_) => "integer",
            ScalarValue::Float(_) => "float",
            ScalarValue::Boolean(_) => "boolean",
            ScalarValue::Date(_) => "date",
            ScalarValue::Time(_) => "time",
            ScalarValue::DateTime(_) => "date_time",
        }
    }

    /// Encode into the form a worksheet cell stores.
    ///
    /// `intern` maps text to its shared-string index. Empty text and non-finite
    /// floats encode as [`CellValue::Empty`].
    pub fn encode<F>(&self, intern: F) -> CellValue
    where
        F: FnOnce(&str) -> usize,
    {
        match self {
            ScalarValue::Text(s) if s.is_empty() => CellValue::Empty,
            ScalarValue::Text(s) => CellValue::SharedString(intern(s)),
            ScalarValue::Integer(n) => CellValue::Integer(*n),
            ScalarValue::Float(n) if !n.is_finite() => CellValue::Empty,
            ScalarValue::Float(n) => CellValue::Number(*n),
            ScalarValue::Boolean(b) => CellValue::Boolean(*b),
            ScalarValue::Date(d) => CellValue::DateSerial(date_serial(*d)),
            ScalarValue::Time(t) => CellValue::DateSerial(time_serial(*t)),
            ScalarValue::DateTime(dt) => CellValue::DateSerial(date_time_serial(*dt)),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Boolean(b)
    }
}

macro_rules! integer_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ScalarValue {
                fn from(n: $t) -> Self {
                    ScalarValue::Integer(n as i64)
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for ScalarValue {
    fn from(n: f32) -> Self {
        ScalarValue::Float(n as f64)
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Float(n)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::text(s)
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(d: NaiveDate) -> Self {
        ScalarValue::Date(d)
    }
}

impl From<NaiveTime> for ScalarValue {
    fn from(t: NaiveTime) -> Self {
        ScalarValue::Time(t)
    }
}

impl From<NaiveDateTime> for ScalarValue {
    fn from(dt: NaiveDateTime) -> Self {
        ScalarValue::DateTime(dt)
    }
}

/// The encoded content of a worksheet cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// No value
    Empty,
    /// Index into the shared-string table (`t="s"`)
    SharedString(usize),
    /// Integer (numeric, no type tag)
    Integer(i64),
    /// Float (numeric, no type tag)
    Number(f64),
    /// Boolean stored as 1/0 (`t="b"`)
    Boolean(bool),
    /// Date serial (numeric, no type tag)
    DateSerial(f64),
}

impl CellValue {
    /// The `t` attribute for this value. Numeric values carry no tag.
    pub fn type_tag(&self) -> Option<&'static str> {
        match self {
            CellValue::SharedString(_) => Some("s"),
            CellValue::Boolean(_) => Some("b"),
            CellValue::Empty
            | CellValue::Integer(_)
            | CellValue::Number(_)
            | CellValue::DateSerial(_) => None,
        }
    }

    /// Text of the `<v>` element, or `None` when the cell has no value
    pub fn text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            other => Some(other.to_string()),
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::SharedString(i) => write!(f, "{}", i),
            CellValue::Integer(n) => write!(f, "{}", n),
            CellValue::Number(n) | CellValue::DateSerial(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "1" } else { "0" }),
        }
    }
}
