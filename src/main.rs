// Main entry point - Dependency injection and session driving
use std::sync::Arc;

use airport_sensor_charts::application::catalog_service::CatalogService;
use airport_sensor_charts::domain::airport::{Airport, SensorKind};
use airport_sensor_charts::infrastructure::api_client::HttpMeasurementClient;
use airport_sensor_charts::infrastructure::config::load_config;
use airport_sensor_charts::presentation::chart_options::ChartPresentationAdapter;
use airport_sensor_charts::presentation::chart_session::ChartSession;
use anyhow::Context;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for chart payloads
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = load_config()?;
    let selection = config.selection.clone();

    // Create client (infrastructure layer)
    let client = Arc::new(HttpMeasurementClient::new(
        &config.api.base_url,
        config.api.request_timeout(),
        config.api.server_zone()?,
    )?);

    // Resolve the airport and sensors (application layer)
    let catalog = CatalogService::new(client.clone());
    let airport = match &selection.airport {
        Some(code) => Airport::new(code),
        None => catalog
            .list_airports()
            .await?
            .into_iter()
            .next()
            .context("No airport configured and none reported by the API")?,
    };
    let sensors: Vec<SensorKind> = if selection.sensors.is_empty() {
        catalog.list_sensors(&airport).await?
    } else {
        selection.sensors.iter().map(SensorKind::new).collect()
    };
    tracing::info!(
        "Charting {} with sensors [{}]",
        airport.code,
        sensors.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", ")
    );

    // Replay the selection one change at a time (presentation layer)
    let presenter = ChartPresentationAdapter::new(config.theme.resolve());
    let mut session = ChartSession::new(client, config.aggregation.deadline(), presenter);
    let mut updates = WatchStream::new(session.subscribe());

    session.select_mode(selection.mode);
    session.select_airport(Some(airport));
    session.select_sensors(sensors);
    let start = selection
        .start
        .as_deref()
        .context("selection.start must be set")?;
    let target = session.select_dates(start, selection.end.as_deref())?;

    while let Some(latest) = updates.next().await {
        if let Some(payload) = latest.filter(|p| p.generation == target) {
            if !payload.data.is_complete() {
                tracing::warn!("Chart is partial, missing: {}", payload.data.missing.join(", "));
            }
            println!("{}", serde_json::to_string_pretty(payload.as_ref())?);
            break;
        }
    }

    Ok(())
}
