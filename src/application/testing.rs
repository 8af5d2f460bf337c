// Scripted in-memory measurement client for tests
use crate::application::measurement_client::{FetchError, MeasurementFetchClient};
use crate::domain::airport::{Airport, SensorKind};
use crate::domain::measurement::{RawDailyAverage, RawSample, Timestamp, parse_timestamp};
use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Europe::Paris;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone)]
struct Scripted<T> {
    delay: Duration,
    reply: Option<T>,
}

impl<T: Clone> Scripted<T> {
    async fn play(&self, url: String) -> Result<T, FetchError> {
        tokio::time::sleep(self.delay).await;
        self.reply.clone().ok_or_else(|| not_found(url))
    }
}

fn not_found(url: String) -> FetchError {
    FetchError::HttpStatus {
        url,
        status: reqwest::StatusCode::NOT_FOUND,
        body: "No data found".to_string(),
    }
}

/// A sample time on the Paris wall clock the test server reports in.
pub fn ts(raw: &str) -> Timestamp {
    parse_timestamp(raw, &Paris).expect("valid test timestamp")
}

pub fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

/// Replies are keyed by airport plus sensor or day; anything unscripted
/// fails immediately with a 404.
#[derive(Default)]
pub struct ScriptedClient {
    airports: Vec<String>,
    sensors: HashMap<String, Vec<String>>,
    ranges: HashMap<(String, String), Scripted<Vec<RawSample>>>,
    days: HashMap<(String, NaiveDate), Scripted<Vec<RawDailyAverage>>>,
    day_measurements: HashMap<(String, NaiveDate, String), Scripted<Vec<RawDailyAverage>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_airports(mut self, codes: &[&str]) -> Self {
        self.airports = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_sensors(mut self, airport: &str, names: &[&str]) -> Self {
        self.sensors.insert(
            airport.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn with_range(
        mut self,
        airport: &str,
        sensor: &str,
        delay_ms: u64,
        samples: &[(&str, f64)],
    ) -> Self {
        let samples = samples
            .iter()
            .map(|(time, value)| RawSample::new(ts(time), *value))
            .collect();
        self.ranges.insert(
            (airport.to_string(), sensor.to_string()),
            Scripted {
                delay: Duration::from_millis(delay_ms),
                reply: Some(samples),
            },
        );
        self
    }

    pub fn with_range_failure(mut self, airport: &str, sensor: &str, delay_ms: u64) -> Self {
        self.ranges.insert(
            (airport.to_string(), sensor.to_string()),
            Scripted {
                delay: Duration::from_millis(delay_ms),
                reply: None,
            },
        );
        self
    }

    pub fn with_day(
        mut self,
        airport: &str,
        date: &str,
        delay_ms: u64,
        averages: &[(&str, f64)],
    ) -> Self {
        let averages = averages
            .iter()
            .map(|(name, value)| RawDailyAverage::new(*name, *value))
            .collect();
        self.days.insert(
            (airport.to_string(), day(date)),
            Scripted {
                delay: Duration::from_millis(delay_ms),
                reply: Some(averages),
            },
        );
        self
    }

    pub fn with_day_failure(mut self, airport: &str, date: &str, delay_ms: u64) -> Self {
        self.days.insert(
            (airport.to_string(), day(date)),
            Scripted {
                delay: Duration::from_millis(delay_ms),
                reply: None,
            },
        );
        self
    }

    pub fn with_day_measurement(
        mut self,
        airport: &str,
        date: &str,
        name: &str,
        delay_ms: u64,
        value: f64,
    ) -> Self {
        self.day_measurements.insert(
            (airport.to_string(), day(date), name.to_string()),
            Scripted {
                delay: Duration::from_millis(delay_ms),
                reply: Some(vec![RawDailyAverage::new(name, value)]),
            },
        );
        self
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MeasurementFetchClient for ScriptedClient {
    async fn get_airports(&self) -> Result<Vec<String>, FetchError> {
        self.record_call();
        Ok(self.airports.clone())
    }

    async fn get_sensors(&self, airport: &Airport) -> Result<Vec<String>, FetchError> {
        self.record_call();
        self.sensors
            .get(&airport.code)
            .cloned()
            .ok_or_else(|| not_found(format!("sensors/{}", airport.code)))
    }

    async fn range_query(
        &self,
        airport: &Airport,
        _start: &str,
        _end: &str,
        sensor: &SensorKind,
    ) -> Result<Vec<RawSample>, FetchError> {
        self.record_call();
        let url = format!("range/{}/{}", airport.code, sensor.name);
        match self.ranges.get(&(airport.code.clone(), sensor.name.clone())) {
            Some(script) => script.play(url).await,
            None => Err(not_found(url)),
        }
    }

    async fn day_average_query(
        &self,
        airport: &Airport,
        day: NaiveDate,
    ) -> Result<Vec<RawDailyAverage>, FetchError> {
        self.record_call();
        let url = format!("average/{}/{}", airport.code, day);
        match self.days.get(&(airport.code.clone(), day)) {
            Some(script) => script.play(url).await,
            None => Err(not_found(url)),
        }
    }

    async fn day_average_query_for(
        &self,
        airport: &Airport,
        day: NaiveDate,
        sensor: &SensorKind,
    ) -> Result<Vec<RawDailyAverage>, FetchError> {
        self.record_call();
        let url = format!("average/{}/{}/{}", airport.code, day, sensor.name);
        let key = (airport.code.clone(), day, sensor.name.clone());
        match self.day_measurements.get(&key) {
            Some(script) => script.play(url).await,
            None => Err(not_found(url)),
        }
    }
}
