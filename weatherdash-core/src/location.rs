//! Device location lookup with a fixed timeout.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Config, error::LocationError, model::Coordinate};

pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Hints passed to a [`LocationService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    pub timeout: Duration,
    pub high_accuracy: bool,
    /// Oldest cached fix the service may return. Zero means always ask fresh.
    pub maximum_age: Duration,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self { timeout: LOCATION_TIMEOUT, high_accuracy: true, maximum_age: Duration::ZERO }
    }
}

#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    async fn locate(&self, options: &LocationOptions) -> Result<Coordinate, LocationError>;
}

/// Current device location using the default options (10s timeout, high accuracy, no cache).
pub async fn current_device_location(
    service: &dyn LocationService,
) -> Result<Coordinate, LocationError> {
    current_device_location_with(service, LocationOptions::default()).await
}

pub async fn current_device_location_with(
    service: &dyn LocationService,
    options: LocationOptions,
) -> Result<Coordinate, LocationError> {
    match tokio::time::timeout(options.timeout, service.locate(&options)).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout(options.timeout.as_secs())),
    }
}

/// The `home` coordinate from config.
#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    home: Option<Coordinate>,
}

impl ConfiguredLocation {
    pub fn new(home: Option<Coordinate>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl LocationService for ConfiguredLocation {
    async fn locate(&self, _options: &LocationOptions) -> Result<Coordinate, LocationError> {
        self.home.ok_or_else(|| {
            LocationError::Unavailable(
                "no home location configured; run `weatherdash configure`".to_string(),
            )
        })
    }
}

/// Approximate location from the public IP address.
///
/// IP lookups have city-level accuracy at best, so `high_accuracy` cannot be honoured.
#[derive(Debug, Clone)]
pub struct IpLocation {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

impl IpLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self { http: Client::new(), url: url.into() }
    }
}

#[async_trait]
impl LocationService for IpLocation {
    async fn locate(&self, options: &LocationOptions) -> Result<Coordinate, LocationError> {
        if options.high_accuracy {
            tracing::debug!("IP geolocation ignores the high-accuracy hint");
        }

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if !res.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "lookup returned status {}",
                res.status()
            )));
        }

        let body: IpApiResponse =
            res.json().await.map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if body.status != "success" {
            return Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        Coordinate::new(body.lat, body.lon).ok_or(LocationError::InvalidCoordinate)
    }
}

/// Pick the location source: the configured home unless `prefer_ip` is set or no
/// home is configured.
pub fn location_service_from_config(config: &Config, prefer_ip: bool) -> Box<dyn LocationService> {
    match config.location.home {
        Some(home) if !prefer_ip => Box::new(ConfiguredLocation::new(Some(home))),
        _ => Box::new(IpLocation::new(config.location.ip_lookup_url.clone())),
    }
}
