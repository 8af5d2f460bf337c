// Catalog service - Use case for listing airports and their sensors
use crate::application::measurement_client::{FetchError, MeasurementFetchClient};
use crate::domain::airport::{Airport, SensorKind};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogService {
    client: Arc<dyn MeasurementFetchClient>,
}

impl CatalogService {
    pub fn new(client: Arc<dyn MeasurementFetchClient>) -> Self {
        Self { client }
    }

    pub async fn list_airports(&self) -> Result<Vec<Airport>, FetchError> {
        let codes = self.client.get_airports().await?;
        let mut seen = HashSet::new();
        Ok(codes
            .into_iter()
            .map(Airport::new)
            .filter(|airport| !airport.code.is_empty() && seen.insert(airport.code.clone()))
            .collect())
    }

    pub async fn list_sensors(&self, airport: &Airport) -> Result<Vec<SensorKind>, FetchError> {
        let names = self.client.get_sensors(airport).await?;
        let mut seen = HashSet::new();
        Ok(names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .map(SensorKind::new)
            .collect())
    }
}
