// Chart-ready dataset domain models
use super::color::allocate_color;
use super::date_range::format_day;
use super::measurement::{SAMPLE_TIME_FORMAT, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// One series per sensor over the raw sample timestamps.
    #[default]
    TimeSeries,
    /// One series per measurement, one point per calendar day.
    DailyAverage,
}

/// A point on the shared x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AxisLabel {
    Time(Timestamp),
    Day(NaiveDate),
}

impl fmt::Display for AxisLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisLabel::Time(time) => write!(f, "{}", time.format(SAMPLE_TIME_FORMAT)),
            AxisLabel::Day(day) => f.write_str(&format_day(*day)),
        }
    }
}

impl Serialize for AxisLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub label: String,
    /// One entry per axis label; `None` where no value was reported.
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    pub background_color: String,
}

impl Series {
    pub fn new(label: String, data: Vec<Option<f64>>) -> Self {
        let color = allocate_color(&label);
        Self {
            label,
            data,
            border_color: color.clone(),
            background_color: color,
        }
    }
}

/// Labels plus series, aligned index by index.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartDataset {
    pub labels: Vec<AxisLabel>,
    pub datasets: Vec<Series>,
    /// Sensors or days that never delivered before the join closed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ChartDataset {
    pub fn new(labels: Vec<AxisLabel>, datasets: Vec<Series>, missing: Vec<String>) -> Self {
        Self {
            labels,
            datasets,
            missing,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.datasets.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn series(&self, label: &str) -> Option<&Series> {
        self.datasets.iter().find(|s| s.label == label)
    }

    /// Every series is as long as the label axis.
    pub fn is_aligned(&self) -> bool {
        self.datasets.iter().all(|s| s.data.len() == self.labels.len())
    }

    pub fn has_unique_labels(&self) -> bool {
        let mut seen = HashSet::new();
        self.datasets.iter().all(|s| seen.insert(s.label.as_str()))
    }
}
