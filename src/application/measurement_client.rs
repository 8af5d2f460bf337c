// Client trait for the remote measurement API
use crate::domain::airport::{Airport, SensorKind};
use crate::domain::measurement::{RawDailyAverage, RawSample};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed with status {status}: {body}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response from {url} has unreadable sample time '{time}'")]
    SampleTime { url: String, time: String },
}

#[async_trait]
pub trait MeasurementFetchClient: Send + Sync {
    /// IATA codes of every airport with recorded data
    async fn get_airports(&self) -> Result<Vec<String>, FetchError>;

    /// Measurement names reported by one airport
    async fn get_sensors(&self, airport: &Airport) -> Result<Vec<String>, FetchError>;

    /// Raw samples of one sensor between two formatted UTC boundaries
    async fn range_query(
        &self,
        airport: &Airport,
        start: &str,
        end: &str,
        sensor: &SensorKind,
    ) -> Result<Vec<RawSample>, FetchError>;

    /// Per-measurement means for one calendar day
    async fn day_average_query(
        &self,
        airport: &Airport,
        day: NaiveDate,
    ) -> Result<Vec<RawDailyAverage>, FetchError>;

    /// Mean of a single measurement for one calendar day
    async fn day_average_query_for(
        &self,
        airport: &Airport,
        day: NaiveDate,
        sensor: &SensorKind,
    ) -> Result<Vec<RawDailyAverage>, FetchError>;
}
