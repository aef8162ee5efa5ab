//! Date serial numbers (1900 date system)
//!
//! Days count from 1899-12-31 so that 1900-01-01 is serial 1. The 1900 system also
//! contains the fictional 1900-02-29 (serial 60), so every date from 1900-03-01 on is
//! shifted up by one. Times are fractions of a 24-hour day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const LEAP_BUG_RIDGE: (i32, u32, u32) = (1900, 2, 28);

fn serial_base() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or(NaiveDate::MIN)
}

/// Serial day number for a calendar date
pub fn date_serial(date: NaiveDate) -> f64 {
    let (y, m, d) = LEAP_BUG_RIDGE;
    let ridge = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
    let days = (date - serial_base()).num_days();

    if date > ridge {
        (days + 1) as f64
    } else {
        days as f64
    }
}

/// Fraction of a day for a time of day (whole seconds; sub-second precision is dropped)
pub fn time_serial(time: NaiveTime) -> f64 {
    time.hour() as f64 / 24.0 + time.minute() as f64 / 1_440.0 + time.second() as f64 / 86_400.0
}

/// Serial number for a date and time: the date serial plus the time fraction
pub fn date_time_serial(date_time: NaiveDateTime) -> f64 {
    date_serial(date_time.date()) + time_serial(date_time.time())
}
