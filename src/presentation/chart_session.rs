// Chart session - Selection state and generation-tagged recomputation
use crate::application::daily_average_aggregator::DailyAverageAggregator;
use crate::application::measurement_client::MeasurementFetchClient;
use crate::application::time_series_aggregator::TimeSeriesAggregator;
use crate::domain::airport::{Airport, SensorKind};
use crate::domain::chart::{ChartDataset, ChartMode};
use crate::domain::date_range::{DateRange, RangeError};
use crate::presentation::chart_options::{ChartPayload, ChartPresentationAdapter};
use chrono::Local;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The latest published chart, if any.
pub type LatestChart = Option<Arc<ChartPayload>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub airport: Option<Airport>,
    pub sensors: Vec<SensorKind>,
    pub range: Option<DateRange>,
    pub mode: ChartMode,
}

/// Holds the user's selection and recomputes the chart on every change.
///
/// Each change starts a new generation. The task of the previous generation
/// is aborted, which drops its in-flight fetches, and a payload is only
/// published while its generation is still the current one. Must be used
/// from within a tokio runtime.
pub struct ChartSession {
    time_series: TimeSeriesAggregator,
    daily_average: DailyAverageAggregator,
    presenter: Arc<ChartPresentationAdapter>,
    selection: Selection,
    /// Formatted range-query boundaries of `selection.range`.
    bounds: Option<(String, String)>,
    generation: Arc<AtomicU64>,
    publisher: Arc<watch::Sender<LatestChart>>,
    in_flight: Option<JoinHandle<()>>,
}

impl ChartSession {
    pub fn new(
        client: Arc<dyn MeasurementFetchClient>,
        deadline: Duration,
        presenter: ChartPresentationAdapter,
    ) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            time_series: TimeSeriesAggregator::new(client.clone(), deadline),
            daily_average: DailyAverageAggregator::new(client, deadline),
            presenter: Arc::new(presenter),
            selection: Selection::default(),
            bounds: None,
            generation: Arc::new(AtomicU64::new(0)),
            publisher: Arc::new(publisher),
            in_flight: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LatestChart> {
        self.publisher.subscribe()
    }

    pub fn latest(&self) -> LatestChart {
        self.publisher.borrow().clone()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Clearing the airport also clears the sensor selection.
    pub fn select_airport(&mut self, airport: Option<Airport>) -> u64 {
        if airport.is_none() {
            self.selection.sensors.clear();
        }
        self.selection.airport = airport;
        self.recompute()
    }

    pub fn select_sensors(&mut self, sensors: Vec<SensorKind>) -> u64 {
        self.selection.sensors = sensors;
        self.recompute()
    }

    /// A range whose query boundaries cannot be formatted is rejected and
    /// leaves the selection and the current generation untouched.
    pub fn select_range(&mut self, range: Option<DateRange>) -> Result<u64, RangeError> {
        let bounds = range.map(|range| range.query_bounds(&Local)).transpose()?;
        self.selection.range = range;
        self.bounds = bounds;
        Ok(self.recompute())
    }

    /// Parse and select a `YYYY-MM-DD` range.
    pub fn select_dates(&mut self, start: &str, end: Option<&str>) -> Result<u64, RangeError> {
        let range = DateRange::parse(start, end)?;
        self.select_range(Some(range))
    }

    pub fn select_mode(&mut self, mode: ChartMode) -> u64 {
        self.selection.mode = mode;
        self.recompute()
    }

    fn recompute(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let Selection {
            airport,
            sensors,
            range,
            mode,
        } = self.selection.clone();

        let (airport, range, (start, end)) = match (airport, range, self.bounds.clone()) {
            (Some(airport), Some(range), Some(bounds)) => (airport, range, bounds),
            _ => {
                tracing::debug!("Generation {}: selection incomplete", generation);
                self.publish_now(generation, mode, ChartDataset::empty());
                return generation;
            }
        };
        if mode == ChartMode::TimeSeries && sensors.is_empty() {
            tracing::debug!("Generation {}: no sensor selected", generation);
            self.publish_now(generation, mode, ChartDataset::empty());
            return generation;
        }

        let time_series = self.time_series.clone();
        let daily_average = self.daily_average.clone();
        let presenter = self.presenter.clone();
        let current = self.generation.clone();
        let publisher = self.publisher.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let data = match mode {
                ChartMode::TimeSeries => {
                    time_series
                        .aggregate(&airport, &sensors, &start, &end)
                        .await
                }
                ChartMode::DailyAverage => {
                    daily_average.aggregate(&airport, &range, &sensors).await
                }
            };
            publish(&current, &publisher, presenter.present(generation, mode, data));
        }));

        generation
    }

    fn publish_now(&self, generation: u64, mode: ChartMode, data: ChartDataset) {
        let payload = self.presenter.present(generation, mode, data);
        publish(&self.generation, &self.publisher, payload);
    }
}

impl Drop for ChartSession {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort();
        }
    }
}

/// Replace the published chart with `payload` if its generation is still
/// current and newer than what is held. Returns whether it was published.
fn publish(
    current: &AtomicU64,
    publisher: &watch::Sender<LatestChart>,
    payload: ChartPayload,
) -> bool {
    let generation = payload.generation;
    let published = publisher.send_if_modified(|latest| {
        if current.load(Ordering::SeqCst) != generation {
            return false;
        }
        if latest.as_ref().is_some_and(|held| held.generation >= generation) {
            return false;
        }
        *latest = Some(Arc::new(payload));
        true
    });

    if published {
        tracing::info!("Published chart generation {}", generation);
    } else {
        tracing::warn!("Discarded stale chart generation {}", generation);
    }
    published
}
