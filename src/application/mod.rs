// Application layer - Use cases over the measurement API
pub mod catalog_service;
pub mod daily_average_aggregator;
pub mod fan_in;
pub mod measurement_client;
pub mod time_series_aggregator;

#[cfg(test)]
pub mod testing;
