// Date range selection, calendar expansion and API timestamp formatting
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use thiserror::Error;

/// Wire format for range boundaries: UTC, second precision, literal `Z`.
pub const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Wire format for the day segment of an average query.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("range end {end} is before range start {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("could not parse date '{input}', expected YYYY-MM-DD")]
    Unparsable {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("date {0} has no following calendar day")]
    OutOfRange(NaiveDate),
}

/// A user-selected span of calendar days.
///
/// A range is always replaced as a whole; it holds `start <= end` once built.
/// A single selected date is represented with `end == start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, RangeError> {
        let end = end.unwrap_or(start);
        if end < start {
            return Err(RangeError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Parse `YYYY-MM-DD` inputs. An empty or absent end selects a single day.
    pub fn parse(start: &str, end: Option<&str>) -> Result<Self, RangeError> {
        let start = parse_day(start)?;
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(end) => Some(parse_day(end)?),
            None => None,
        };
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every calendar day from `start` to `end` inclusive, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|day| *day <= self.end)
            .collect()
    }

    /// Formatted `(start, end)` boundaries for a range query.
    ///
    /// Boundaries are local midnights in `tz`. A single-day range ends at the
    /// following midnight so the query covers that whole day.
    pub fn query_bounds<Tz: TimeZone>(&self, tz: &Tz) -> Result<(String, String), RangeError> {
        let end_day = if self.is_single_day() {
            next_day(self.start)?
        } else {
            self.end
        };
        Ok((
            format_timestamp(&local_midnight(self.start, tz)),
            format_timestamp(&local_midnight(end_day, tz)),
        ))
    }
}

fn parse_day(input: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(input.trim(), API_DATE_FORMAT).map_err(|source| {
        RangeError::Unparsable {
            input: input.to_string(),
            source,
        }
    })
}

/// The calendar day after `day`.
pub fn next_day(day: NaiveDate) -> Result<NaiveDate, RangeError> {
    day.checked_add_days(Days::new(1))
        .ok_or(RangeError::OutOfRange(day))
}

/// Format any zoned instant as `YYYY-MM-DDTHH:MM:SSZ` in UTC.
pub fn format_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .format(API_TIMESTAMP_FORMAT)
        .to_string()
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(API_DATE_FORMAT).to_string()
}

/// The instant the calendar day starts in `tz`.
///
/// Ambiguous midnights resolve to the earlier instant. When a DST jump skips
/// 00:00 the day starts at the first wall-clock minute after the gap.
pub fn local_midnight<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=MINUTES_PER_DAY)
        .filter_map(|minutes| midnight.checked_add_signed(TimeDelta::minutes(minutes)))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|start| start.with_timezone(&Utc))
        // no zone skips a whole day; only reachable at the edge of the calendar
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

const MINUTES_PER_DAY: i64 = 24 * 60;
