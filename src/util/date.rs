use chrono::{DateTime, Local, NaiveDateTime};
use std::time::SystemTime;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Modification times travel as local wall-clock `YYYY-MM-DD HH:MM:SS`
pub fn local_timestamp(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
}
