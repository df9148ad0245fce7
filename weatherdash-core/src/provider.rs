use crate::{
    Config,
    error::WeatherError,
    model::{Alert, Coordinate, CurrentConditions, ForecastSeries, PlaceQuery},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Forecast points covering five days at 3-hour steps.
pub const FIVE_DAY_POINTS: usize = 40;

/// Forecast points covering the next 24 hours at 3-hour steps.
pub const HOURLY_RAW_POINTS: usize = 8;

/// Retrieval operations against a weather data source.
///
/// Implementations do not retry and do not cache.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_current(&self, query: &PlaceQuery) -> Result<CurrentConditions, WeatherError>;

    /// Raw forecast at the provider's native cadence, at most `horizon_points` entries.
    async fn get_forecast(
        &self,
        query: &PlaceQuery,
        horizon_points: usize,
    ) -> Result<ForecastSeries, WeatherError>;

    async fn get_hourly_raw(&self, query: &PlaceQuery) -> Result<ForecastSeries, WeatherError> {
        self.get_forecast(query, HOURLY_RAW_POINTS).await
    }

    /// Alerts are supplementary: failures are logged and produce an empty list.
    async fn get_alerts(&self, coordinate: Coordinate) -> Vec<Alert>;

    /// Name of the place at `coordinate`, `None` when the provider knows nothing there.
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Option<String>, WeatherError>;
}

/// Construct the provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;

    Ok(Box::new(OpenWeatherProvider::with_settings(
        api_key.to_owned(),
        &config.provider,
    )))
}
