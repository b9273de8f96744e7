//! Timestamps stamped on the VLAN allocation container.

use chrono::{DateTime, Local, TimeZone};

/// `YYYY-MM-DD HH:MM:SS ±HH:MM`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time in container format.
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}
