//! Test doubles shared by unit tests.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::{
    error::WeatherError,
    model::{Alert, Coordinate, CurrentConditions, ForecastSeries, ObservationPoint, PlaceQuery},
    provider::{HOURLY_RAW_POINTS, WeatherProvider},
};

// 2024-05-01T00:00:00Z
pub(crate) const T0: i64 = 1_714_521_600;

pub(crate) fn at(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).unwrap()
}

pub(crate) fn point(ts: i64, temp: f64, condition: &str) -> ObservationPoint {
    ObservationPoint {
        time: at(ts),
        temperature: temp,
        feels_like: temp,
        humidity: 65,
        pressure: 1011,
        wind_speed: 3.5,
        wind_direction: 120,
        cloud_cover: 30,
        condition: condition.to_string(),
        description: condition.to_lowercase(),
        icon: "02d".to_string(),
        precipitation_probability: Some(0.3),
    }
}

pub(crate) fn series(start: i64, count: i64) -> ForecastSeries {
    (0..count).map(|i| point(start + i * 10_800, 15.0 + i as f64, "Clouds")).collect()
}

pub(crate) fn current(name: &str, coordinate: Option<Coordinate>) -> CurrentConditions {
    CurrentConditions {
        observation: point(T0, 20.0, "Clear"),
        name: name.to_string(),
        country: Some("CN".to_string()),
        coordinate,
        utc_offset_secs: 8 * 3600,
    }
}

pub(crate) fn alert(event: &str) -> Alert {
    Alert {
        event: event.to_string(),
        source: "Test Observatory".to_string(),
        start: at(T0),
        end: at(T0 + 86_400),
        description: "Test alert".to_string(),
        tags: vec!["Wind".to_string()],
    }
}

/// Failure a [`FakeProvider`] operation should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fail {
    NotFound,
    Unauthorized,
    RateLimited,
    Network,
}

impl Fail {
    fn into_error(self, query: &str) -> WeatherError {
        match self {
            Fail::NotFound => WeatherError::NotFound { place: query.to_string() },
            Fail::Unauthorized => WeatherError::Unauthorized,
            Fail::RateLimited => WeatherError::RateLimited,
            Fail::Network => WeatherError::NetworkUnavailable { target: query.to_string() },
        }
    }
}

/// Scripted provider that counts calls and records the queries it saw.
#[derive(Debug)]
pub(crate) struct FakeProvider {
    pub current: Result<CurrentConditions, Fail>,
    pub forecast: Result<ForecastSeries, Fail>,
    pub hourly: Result<ForecastSeries, Fail>,
    pub alerts: Result<Vec<Alert>, Fail>,
    pub reverse: Result<Option<String>, Fail>,
    pub delay: Duration,

    pub current_calls: AtomicUsize,
    pub forecast_calls: AtomicUsize,
    pub hourly_calls: AtomicUsize,
    pub alerts_calls: AtomicUsize,
    pub reverse_calls: AtomicUsize,
    pub queries: Mutex<Vec<PlaceQuery>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            current: Ok(current("Xiamen", Coordinate::new(24.48, 118.09))),
            forecast: Ok(series(T0, 40)),
            hourly: Ok(series(T0, HOURLY_RAW_POINTS as i64)),
            alerts: Ok(vec![alert("Typhoon Warning")]),
            reverse: Ok(Some("Xiamen, Fujian, CN".to_string())),
            delay: Duration::ZERO,
            current_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
            hourly_calls: AtomicUsize::new(0),
            alerts_calls: AtomicUsize::new(0),
            reverse_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl FakeProvider {
    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn record(&self, query: &PlaceQuery) {
        self.queries.lock().unwrap().push(query.clone());
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn get_current(&self, query: &PlaceQuery) -> Result<CurrentConditions, WeatherError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.record(query);
        self.pause().await;
        self.current.clone().map_err(|f| f.into_error(&query.label()))
    }

    async fn get_forecast(
        &self,
        query: &PlaceQuery,
        _horizon_points: usize,
    ) -> Result<ForecastSeries, WeatherError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        self.record(query);
        self.pause().await;
        self.forecast.clone().map_err(|f| f.into_error(&query.label()))
    }

    async fn get_hourly_raw(&self, query: &PlaceQuery) -> Result<ForecastSeries, WeatherError> {
        self.hourly_calls.fetch_add(1, Ordering::SeqCst);
        self.record(query);
        self.pause().await;
        self.hourly.clone().map_err(|f| f.into_error(&query.label()))
    }

    async fn get_alerts(&self, coordinate: Coordinate) -> Vec<Alert> {
        self.alerts_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        // Same degradation contract as the real gateway.
        self.alerts.clone().unwrap_or_else(|f| {
            let error = f.into_error(&coordinate.to_string());
            tracing::warn!(%coordinate, %error, "alerts failed");
            Vec::new()
        })
    }

    async fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<String>, WeatherError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        self.reverse.clone().map_err(|f| f.into_error(&coordinate.to_string()))
    }
}
