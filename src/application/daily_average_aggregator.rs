// Daily-average use case - one series per measurement, one point per day
use crate::application::fan_in::{Settlement, join_all_until};
use crate::application::measurement_client::{FetchError, MeasurementFetchClient};
use crate::domain::airport::{Airport, SensorKind};
use crate::domain::chart::{AxisLabel, ChartDataset, Series};
use crate::domain::date_range::{DateRange, format_day};
use crate::domain::measurement::RawDailyAverage;
use chrono::NaiveDate;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

type DayReply<'a> = BoxFuture<'a, Result<Vec<RawDailyAverage>, FetchError>>;

/// One fetch of the fan-out: a day, optionally narrowed to one measurement.
struct DayFetch {
    index: usize,
    day: NaiveDate,
    measurement: Option<String>,
}

impl DayFetch {
    fn describe(&self) -> String {
        match &self.measurement {
            Some(name) => format!("{}/{}", format_day(self.day), name),
            None => format_day(self.day),
        }
    }
}

#[derive(Clone)]
pub struct DailyAverageAggregator {
    client: Arc<dyn MeasurementFetchClient>,
    deadline: Duration,
}

impl DailyAverageAggregator {
    pub fn new(client: Arc<dyn MeasurementFetchClient>, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    /// Fetch the daily means of every day in `range` and lay them out on a
    /// calendar axis.
    ///
    /// The base plan is one fetch per day, each returning every measurement;
    /// that is what an empty `measurements` filter does. A non-empty filter is
    /// an extension on top of it: it narrows each day to the per-measurement
    /// endpoint, so the request count becomes days x measurements.
    /// `data[i]` of every series always belongs to `labels[i]`, whatever
    /// order the replies arrive in. Days without a value are `None`.
    pub async fn aggregate(
        &self,
        airport: &Airport,
        range: &DateRange,
        measurements: &[SensorKind],
    ) -> ChartDataset {
        let days = range.days();
        if days.is_empty() {
            return ChartDataset::empty();
        }
        let measurements = SensorKind::distinct(measurements);

        let plan: Vec<DayFetch> = days
            .iter()
            .enumerate()
            .flat_map(|(index, day)| {
                let names: Vec<Option<String>> = if measurements.is_empty() {
                    vec![None]
                } else {
                    measurements.iter().map(|m| Some(m.name.clone())).collect()
                };
                names.into_iter().map(move |measurement| DayFetch {
                    index,
                    day: *day,
                    measurement,
                })
            })
            .collect();

        tracing::debug!(
            "Fetching daily averages for {} over {} days ({} requests)",
            airport.code,
            days.len(),
            plan.len()
        );

        let fetches: Vec<_> = plan
            .iter()
            .map(|fetch| self.fetch_day(airport, fetch))
            .collect();
        let outcomes = join_all_until(fetches, self.deadline).await;

        // per-day slots, filled in calendar position
        let mut slots: Vec<Vec<RawDailyAverage>> = vec![Vec::new(); days.len()];
        let mut missing = Vec::new();
        for (fetch, outcome) in plan.iter().zip(outcomes) {
            match outcome {
                Settlement::Delivered(averages) => {
                    let wanted = fetch.measurement.as_deref();
                    slots[fetch.index].extend(
                        averages
                            .into_iter()
                            .filter(|a| wanted.is_none_or(|name| a.measurement == name)),
                    );
                }
                Settlement::Failed(e) => {
                    tracing::warn!(
                        "Dropping average {} for {}: {}",
                        fetch.describe(),
                        airport.code,
                        e
                    );
                    missing.push(fetch.describe());
                }
                Settlement::TimedOut => {
                    tracing::warn!("Average {} for {} timed out", fetch.describe(), airport.code);
                    missing.push(fetch.describe());
                }
            }
        }

        let seed: Vec<String> = measurements.into_iter().map(|m| m.name).collect();
        build_dataset(&days, slots, seed, missing)
    }

    fn fetch_day<'a>(&'a self, airport: &'a Airport, fetch: &DayFetch) -> DayReply<'a> {
        let day = fetch.day;
        match &fetch.measurement {
            Some(name) => {
                let sensor = SensorKind::new(name.clone());
                Box::pin(async move {
                    self.client
                        .day_average_query_for(airport, day, &sensor)
                        .await
                })
            }
            None => self.client.day_average_query(airport, day),
        }
    }
}

/// Series come out in `seed` order, then in order of first appearance on the
/// calendar. A measurement repeated within one day keeps its last value.
fn build_dataset(
    days: &[NaiveDate],
    slots: Vec<Vec<RawDailyAverage>>,
    seed: Vec<String>,
    missing: Vec<String>,
) -> ChartDataset {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut series: Vec<(String, Vec<Option<f64>>)> = Vec::new();

    for name in seed {
        if !positions.contains_key(&name) {
            positions.insert(name.clone(), series.len());
            series.push((name, vec![None; days.len()]));
        }
    }

    for (index, averages) in slots.into_iter().enumerate() {
        for average in averages {
            let position = *positions.entry(average.measurement.clone()).or_insert_with(|| {
                series.push((average.measurement.clone(), vec![None; days.len()]));
                series.len() - 1
            });
            series[position].1[index] = Some(average.value);
        }
    }

    ChartDataset::new(
        days.iter().copied().map(AxisLabel::Day).collect(),
        series
            .into_iter()
            .map(|(label, data)| Series::new(label, data))
            .collect(),
        missing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{ScriptedClient, day};

    fn aggregator(client: ScriptedClient) -> (DailyAverageAggregator, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        (DailyAverageAggregator::new(client.clone(), Duration::from_secs(10)), client)
    }

    fn march() -> DateRange {
        DateRange::new(day("2024-03-01"), Some(day("2024-03-03"))).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_align_to_calendar_day() {
        // replies arrive day 3, day 1, day 2
        let (aggregator, client) = aggregator(
            ScriptedClient::new()
                .with_day("MRS", "2024-03-01", 20, &[("temperature", 5.0)])
                .with_day("MRS", "2024-03-02", 30, &[("temperature", 7.0)])
                .with_day("MRS", "2024-03-03", 10, &[("temperature", 6.0)]),
        );

        let dataset = aggregator.aggregate(&Airport::new("MRS"), &march(), &[]).await;

        assert_eq!(client.calls(), 3);
        assert_eq!(
            dataset.labels,
            vec![
                AxisLabel::Day(day("2024-03-01")),
                AxisLabel::Day(day("2024-03-02")),
                AxisLabel::Day(day("2024-03-03"))
            ]
        );
        assert_eq!(
            dataset.series("temperature").unwrap().data,
            vec![Some(5.0), Some(7.0), Some(6.0)]
        );
        assert!(dataset.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_measurement_first_seen_late_stays_aligned() {
        let (aggregator, _) = aggregator(
            ScriptedClient::new()
                .with_day("MRS", "2024-03-01", 30, &[("temperature", 5.0)])
                .with_day("MRS", "2024-03-02", 20, &[("temperature", 7.0)])
                .with_day("MRS", "2024-03-03", 10, &[("temperature", 6.0), ("wind", 2.5)]),
        );

        let dataset = aggregator.aggregate(&Airport::new("MRS"), &march(), &[]).await;

        let labels: Vec<_> = dataset.datasets.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["temperature", "wind"]);
        assert_eq!(dataset.series("wind").unwrap().data, vec![None, None, Some(2.5)]);
        assert!(dataset.is_aligned());
        assert!(dataset.has_unique_labels());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_day_leaves_gap() {
        let (aggregator, _) = aggregator(
            ScriptedClient::new()
                .with_day("MRS", "2024-03-01", 10, &[("temperature", 5.0)])
                .with_day_failure("MRS", "2024-03-02", 10)
                .with_day("MRS", "2024-03-03", 10, &[("temperature", 6.0)]),
        );

        let dataset = aggregator.aggregate(&Airport::new("MRS"), &march(), &[]).await;

        assert_eq!(dataset.labels.len(), 3);
        assert_eq!(
            dataset.series("temperature").unwrap().data,
            vec![Some(5.0), None, Some(6.0)]
        );
        assert_eq!(dataset.missing, vec!["2024-03-02".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_day_is_cut_off_at_deadline() {
        let (aggregator, _) = aggregator(
            ScriptedClient::new()
                .with_day("MRS", "2024-03-01", 10, &[("temperature", 5.0)])
                .with_day("MRS", "2024-03-02", 10, &[("temperature", 7.0)])
                .with_day("MRS", "2024-03-03", 3_600_000, &[("temperature", 6.0)]),
        );

        let dataset = aggregator.aggregate(&Airport::new("MRS"), &march(), &[]).await;

        assert_eq!(
            dataset.series("temperature").unwrap().data,
            vec![Some(5.0), Some(7.0), None]
        );
        assert_eq!(dataset.missing, vec!["2024-03-03".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_measurement_filter_fetches_per_day_and_measurement() {
        let (aggregator, client) = aggregator(
            ScriptedClient::new()
                .with_day_measurement("MRS", "2024-03-01", "pressure", 30, 1020.0)
                .with_day_measurement("MRS", "2024-03-02", "pressure", 10, 1018.5),
        );
        let range = DateRange::new(day("2024-03-01"), Some(day("2024-03-02"))).unwrap();

        let dataset = aggregator
            .aggregate(&Airport::new("MRS"), &range, &[SensorKind::new("pressure")])
            .await;

        assert_eq!(client.calls(), 2);
        assert_eq!(dataset.datasets.len(), 1);
        assert_eq!(
            dataset.series("pressure").unwrap().data,
            vec![Some(1020.0), Some(1018.5)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_count_is_days_without_filter_and_days_times_filter_with_one() {
        let client = ScriptedClient::new()
            .with_day("MRS", "2024-03-01", 10, &[("pressure", 1020.0), ("wind", 2.0)])
            .with_day("MRS", "2024-03-02", 10, &[("pressure", 1018.5), ("wind", 3.0)])
            .with_day_measurement("MRS", "2024-03-01", "pressure", 10, 1020.0)
            .with_day_measurement("MRS", "2024-03-02", "pressure", 10, 1018.5)
            .with_day_measurement("MRS", "2024-03-01", "wind", 10, 2.0)
            .with_day_measurement("MRS", "2024-03-02", "wind", 10, 3.0);
        let (aggregator, client) = aggregator(client);
        let range = DateRange::new(day("2024-03-01"), Some(day("2024-03-02"))).unwrap();
        let airport = Airport::new("MRS");

        let unfiltered = aggregator.aggregate(&airport, &range, &[]).await;
        assert_eq!(client.calls(), 2);

        let filter = [SensorKind::new("pressure"), SensorKind::new("wind")];
        let filtered = aggregator.aggregate(&airport, &range, &filter).await;
        assert_eq!(client.calls(), 2 + 4);

        assert_eq!(unfiltered.labels, filtered.labels);
        assert_eq!(
            unfiltered.series("wind").unwrap().data,
            filtered.series("wind").unwrap().data
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_day_range() {
        let (aggregator, _) = aggregator(
            ScriptedClient::new().with_day(
                "MRS",
                "2024-01-16",
                10,
                &[("temperature", 22.15), ("wind", 2.55)],
            ),
        );

        let dataset = aggregator
            .aggregate(&Airport::new("MRS"), &DateRange::single(day("2024-01-16")), &[])
            .await;

        assert_eq!(dataset.labels, vec![AxisLabel::Day(day("2024-01-16"))]);
        assert_eq!(dataset.datasets.len(), 2);
    }
}
