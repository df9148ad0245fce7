use std::sync::Arc;

use crate::{error::WeatherError, model::AggregatedWeather};

/// What the dashboard currently shows.
///
/// Every update replaces the whole value, so weather data and an error message
/// are never visible together.
#[derive(Debug, Clone, Default)]
pub enum DashboardView {
    #[default]
    Empty,
    Loaded(Arc<AggregatedWeather>),
    Failed(String),
}

impl DashboardView {
    /// Replace the view with the outcome of the most recently completed query.
    pub fn apply(&mut self, result: Result<AggregatedWeather, WeatherError>) {
        *self = match result {
            Ok(weather) => DashboardView::Loaded(Arc::new(weather)),
            Err(e) => DashboardView::Failed(e.to_string()),
        };
    }

    pub fn weather(&self) -> Option<&AggregatedWeather> {
        match self {
            DashboardView::Loaded(weather) => Some(weather.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DashboardView::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
