//! Core library for the `weatherdash` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The provider gateway (OpenWeatherMap) and its error taxonomy
//! - Place name resolution
//! - Aggregation of current conditions, forecasts and alerts into one result
//! - Hourly resampling of the 3-hour forecast
//! - Recent-place history, device location and calendar fun facts
//!
//! It is used by `weatherdash-cli`, but can also be reused by other front ends.

pub mod aggregate;
pub mod config;
pub mod daily;
pub mod error;
pub mod funfacts;
pub mod location;
pub mod model;
pub mod provider;
pub mod recent;
pub mod resample;
pub mod resolver;
pub mod view;

#[cfg(test)]
mod testing;

pub use aggregate::Aggregator;
pub use config::{Config, LocationSettings, ProviderSettings};
pub use error::{LocationError, WeatherError};
pub use model::{
    AggregatedWeather, Alert, Coordinate, CurrentConditions, DailySummary, ForecastSeries,
    ObservationPoint, PlaceQuery,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use recent::{RecentPlaces, RecentPlacesStore};
pub use view::DashboardView;
