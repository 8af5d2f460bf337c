// Time-series use case - one series per sensor over the raw sample times
use crate::application::fan_in::{Settlement, join_all_until};
use crate::application::measurement_client::MeasurementFetchClient;
use crate::domain::airport::{Airport, SensorKind};
use crate::domain::chart::{AxisLabel, ChartDataset, Series};
use crate::domain::measurement::{RawSample, Timestamp};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct TimeSeriesAggregator {
    client: Arc<dyn MeasurementFetchClient>,
    deadline: Duration,
}

impl TimeSeriesAggregator {
    pub fn new(client: Arc<dyn MeasurementFetchClient>, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    /// Fetch every selected sensor between `start` and `end` and join the
    /// replies into one dataset.
    ///
    /// Series follow the selection order. The x axis is the sorted union of
    /// all sample times and each series holds `None` where it has no sample.
    /// Sensors that fail or miss the deadline are listed in `missing`.
    pub async fn aggregate(
        &self,
        airport: &Airport,
        sensors: &[SensorKind],
        start: &str,
        end: &str,
    ) -> ChartDataset {
        let sensors = SensorKind::distinct(sensors);
        if sensors.is_empty() {
            return ChartDataset::empty();
        }

        tracing::debug!(
            "Fetching {} sensors for {} between {} and {}",
            sensors.len(),
            airport.code,
            start,
            end
        );

        let fetches: Vec<_> = sensors
            .iter()
            .map(|sensor| self.client.range_query(airport, start, end, sensor))
            .collect();
        let outcomes = join_all_until(fetches, self.deadline).await;

        let mut delivered = Vec::new();
        let mut missing = Vec::new();
        for (sensor, outcome) in sensors.into_iter().zip(outcomes) {
            match outcome {
                Settlement::Delivered(samples) => delivered.push((sensor, samples)),
                Settlement::Failed(e) => {
                    tracing::warn!("Dropping sensor {} for {}: {}", sensor.name, airport.code, e);
                    missing.push(sensor.name);
                }
                Settlement::TimedOut => {
                    tracing::warn!("Sensor {} for {} timed out", sensor.name, airport.code);
                    missing.push(sensor.name);
                }
            }
        }

        build_dataset(delivered, missing)
    }
}

fn build_dataset(
    delivered: Vec<(SensorKind, Vec<RawSample>)>,
    missing: Vec<String>,
) -> ChartDataset {
    // a repeated timestamp within one sensor keeps its last value
    let by_time: Vec<(SensorKind, BTreeMap<Timestamp, f64>)> = delivered
        .into_iter()
        .map(|(sensor, samples)| {
            let values = samples.into_iter().map(|s| (s.time, s.value)).collect();
            (sensor, values)
        })
        .collect();

    let axis: BTreeSet<Timestamp> = by_time
        .iter()
        .flat_map(|(_, values)| values.keys().copied())
        .collect();

    let datasets = by_time
        .into_iter()
        .map(|(sensor, values)| {
            let data = axis.iter().map(|time| values.get(time).copied()).collect();
            Series::new(sensor.name, data)
        })
        .collect();

    ChartDataset::new(
        axis.into_iter().map(AxisLabel::Time).collect(),
        datasets,
        missing,
    )
}
