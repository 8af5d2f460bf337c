// Raw measurement samples as returned by the remote API
use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::Deserialize;

/// Wall-clock format the API uses for sample times.
pub const SAMPLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sample instant on the wall clock of the server's time zone.
pub type Timestamp = NaiveDateTime;

/// One reading of one sensor at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub time: Timestamp,
    pub value: f64,
}

impl RawSample {
    pub fn new(time: Timestamp, value: f64) -> Self {
        Self { time, value }
    }
}

/// The mean of one measurement over one day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawDailyAverage {
    pub measurement: String,
    pub value: f64,
}

impl RawDailyAverage {
    pub fn new(measurement: impl Into<String>, value: f64) -> Self {
        Self {
            measurement: measurement.into(),
            value,
        }
    }
}

/// Parse a sample time onto the wall clock of `zone`, the zone the server
/// writes its sample times in.
///
/// `YYYY-MM-DD HH:MM:SS` is already on that clock. RFC 3339 times carry
/// their own offset and are converted into `zone`, so both forms of one
/// instant parse to the same value.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, zone: &Tz) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(time) = NaiveDateTime::parse_from_str(raw, SAMPLE_TIME_FORMAT) {
        return Some(time);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|time| time.with_timezone(zone).naive_local())
}
