use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// A latitude/longitude pair. Only constructed for usable values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Returns `None` for values that mean "no location": both zero, non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if latitude == 0.0 && longitude == 0.0 {
            return None;
        }
        if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
            return None;
        }

        Some(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// How a request addresses a place.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceQuery {
    Name(String),
    Coordinates(Coordinate),
}

impl PlaceQuery {
    /// Build a name query, rejecting empty input before any network call.
    pub fn name(name: impl Into<String>) -> Result<Self, WeatherError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WeatherError::InvalidInput("City name is required".to_string()));
        }
        Ok(PlaceQuery::Name(name))
    }

    /// Build a coordinate query from raw values.
    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        Coordinate::new(latitude, longitude)
            .map(PlaceQuery::Coordinates)
            .ok_or_else(|| {
                WeatherError::InvalidInput(format!(
                    "Coordinates ({latitude}, {longitude}) are missing or out of range"
                ))
            })
    }

    /// The place as it should appear inside user-facing messages.
    pub fn label(&self) -> String {
        match self {
            PlaceQuery::Name(name) => name.trim().to_string(),
            PlaceQuery::Coordinates(coord) => coord.to_string(),
        }
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceQuery::Name(name) => write!(f, "\"{}\"", name.trim()),
            PlaceQuery::Coordinates(coord) => write!(f, "coordinates {coord}"),
        }
    }
}

/// A single weather sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    /// hPa
    pub pressure: u32,
    /// m/s
    pub wind_speed: f64,
    pub wind_direction: u16,
    pub cloud_cover: u8,
    /// Short condition group, e.g. "Rain".
    pub condition: String,
    pub description: String,
    pub icon: String,
    /// 0.0..=1.0, only present on forecast points.
    pub precipitation_probability: Option<f64>,
}

/// Points ascending by time.
pub type ForecastSeries = Vec<ObservationPoint>;

/// Result of the current-conditions lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub observation: ObservationPoint,
    pub name: String,
    pub country: Option<String>,
    pub coordinate: Option<Coordinate>,
    /// Shift from UTC of the place, in seconds.
    pub utc_offset_secs: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub event: String,
    pub source: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
    pub tags: Vec<String>,
}

/// Per-day rollup of the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub avg_temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub condition: String,
    pub icon: String,
    pub description: String,
}

/// Everything the dashboard shows for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWeather {
    pub display_name: String,
    pub current: CurrentConditions,
    pub forecast: ForecastSeries,
    pub daily: Vec<DailySummary>,
    pub hourly: ForecastSeries,
    pub alerts: Vec<Alert>,
}
