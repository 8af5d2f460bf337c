// HTTP implementation of the measurement API client
use crate::application::measurement_client::{FetchError, MeasurementFetchClient};
use crate::domain::airport::{Airport, SensorKind};
use crate::domain::date_range::format_day;
use crate::domain::measurement::{RawDailyAverage, RawSample, parse_timestamp};
use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpMeasurementClient {
    base_url: String,
    client: reqwest::Client,
    /// Zone the server writes wall-clock sample times in.
    server_zone: Tz,
}

#[derive(Debug, Deserialize)]
struct AirportRow {
    airport: String,
}

#[derive(Debug, Deserialize)]
struct SensorRow {
    measurement: String,
}

#[derive(Debug, Deserialize)]
struct SampleRow {
    time: String,
    value: f64,
}

/// Resolve raw row times onto the server's wall clock.
fn resolve_samples(
    url: &str,
    rows: Vec<SampleRow>,
    zone: &Tz,
) -> Result<Vec<RawSample>, FetchError> {
    rows.into_iter()
        .map(|row| match parse_timestamp(&row.time, zone) {
            Some(time) => Ok(RawSample::new(time, row.value)),
            None => Err(FetchError::SampleTime {
                url: url.to_string(),
                time: row.time,
            }),
        })
        .collect()
}

impl HttpMeasurementClient {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        server_zone: Tz,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            server_zone,
        })
    }

    fn build_url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::HttpStatus { url, status, body });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| FetchError::Decode { url, source })
    }
}

#[async_trait]
impl MeasurementFetchClient for HttpMeasurementClient {
    async fn get_airports(&self) -> Result<Vec<String>, FetchError> {
        let url = self.build_url(&["airports"]);
        let rows: Vec<AirportRow> = self.get_json(url).await?;
        Ok(rows.into_iter().map(|row| row.airport).collect())
    }

    async fn get_sensors(&self, airport: &Airport) -> Result<Vec<String>, FetchError> {
        let url = self.build_url(&["airport", airport.code.as_str(), "sensors"]);
        let rows: Vec<SensorRow> = self.get_json(url).await?;
        Ok(rows.into_iter().map(|row| row.measurement).collect())
    }

    async fn range_query(
        &self,
        airport: &Airport,
        start: &str,
        end: &str,
        sensor: &SensorKind,
    ) -> Result<Vec<RawSample>, FetchError> {
        let url = self.build_url(&[
            "airport",
            airport.code.as_str(),
            "data",
            "range",
            start,
            end,
            sensor.name.as_str(),
        ]);
        let rows: Vec<SampleRow> = self.get_json(url.clone()).await?;
        resolve_samples(&url, rows, &self.server_zone)
    }

    async fn day_average_query(
        &self,
        airport: &Airport,
        day: NaiveDate,
    ) -> Result<Vec<RawDailyAverage>, FetchError> {
        let day = format_day(day);
        let url = self.build_url(&["airport", airport.code.as_str(), "average", day.as_str()]);
        self.get_json(url).await
    }

    async fn day_average_query_for(
        &self,
        airport: &Airport,
        day: NaiveDate,
        sensor: &SensorKind,
    ) -> Result<Vec<RawDailyAverage>, FetchError> {
        let day = format_day(day);
        let url = self.build_url(&[
            "airport",
            airport.code.as_str(),
            "average",
            day.as_str(),
            sensor.name.as_str(),
        ]);
        self.get_json(url).await
    }
}
