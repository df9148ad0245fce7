//! Fans a single place query out to the provider and assembles the dashboard result.

use std::{sync::Arc, time::Instant};

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::{
    daily::{FORECAST_DAYS, daily_summaries},
    error::WeatherError,
    model::{AggregatedWeather, CurrentConditions, PlaceQuery},
    provider::{FIVE_DAY_POINTS, WeatherProvider},
    resample::resample,
    resolver,
};

/// Entry point used by the presentation layer.
///
/// Each call is independent; the aggregator holds no per-query state.
#[derive(Debug, Clone)]
pub struct Aggregator {
    provider: Arc<dyn WeatherProvider>,
}

impl Aggregator {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Aggregate with the dense hourly series anchored at the caller's local time.
    pub async fn aggregate(&self, query: &PlaceQuery) -> Result<AggregatedWeather, WeatherError> {
        self.aggregate_at(query, Local::now()).await
    }

    /// Aggregate with an explicit anchor for the hourly series. The series starts at
    /// the top of the anchor's hour in the anchor's own time zone.
    ///
    /// Current conditions are fetched first; if that fails nothing else is requested.
    /// Forecast, hourly and alerts are then fetched concurrently and all three are
    /// awaited. A forecast or hourly failure fails the whole call (forecast reported
    /// first when both fail). Alerts never fail it.
    #[tracing::instrument(skip(self, anchor), fields(query = %query))]
    pub async fn aggregate_at<Tz>(
        &self,
        query: &PlaceQuery,
        anchor: DateTime<Tz>,
    ) -> Result<AggregatedWeather, WeatherError>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let started = Instant::now();
        let result = self.run(query, anchor.fixed_offset()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(weather) => info!(
                display_name = %weather.display_name,
                alerts = weather.alerts.len(),
                elapsed_ms,
                "Aggregated weather"
            ),
            Err(e) => warn!(error = %e, elapsed_ms, "Aggregation failed"),
        }

        result
    }

    async fn run(
        &self,
        query: &PlaceQuery,
        anchor: DateTime<FixedOffset>,
    ) -> Result<AggregatedWeather, WeatherError> {
        let (resolved, typed_name) = match query {
            PlaceQuery::Name(name) => (
                PlaceQuery::Name(resolver::resolve(name)?),
                Some(name.trim().to_string()),
            ),
            PlaceQuery::Coordinates(coord) => (PlaceQuery::Coordinates(*coord), None),
        };

        // Report the place the user typed, not the resolved identifier.
        let relabel = |e: WeatherError| match &typed_name {
            Some(name) => e.relabel_place(name),
            None => e,
        };

        let current = self.provider.get_current(&resolved).await.map_err(relabel)?;

        let alerts = async {
            match current.coordinate {
                Some(coord) => self.provider.get_alerts(coord).await,
                None => {
                    debug!("Provider returned no coordinate, skipping alerts");
                    Vec::new()
                }
            }
        };

        let (forecast, hourly_raw, alerts) = tokio::join!(
            self.provider.get_forecast(&resolved, FIVE_DAY_POINTS),
            self.provider.get_hourly_raw(&resolved),
            alerts,
        );

        let forecast = forecast.map_err(relabel)?;
        let hourly_raw = hourly_raw.map_err(relabel)?;

        let hourly = resample(&hourly_raw, anchor)?;

        let offset = FixedOffset::east_opt(current.utc_offset_secs).unwrap_or_else(|| Utc.fix());
        let daily = daily_summaries(&forecast, offset, FORECAST_DAYS);

        let display_name = match typed_name {
            Some(name) => name,
            None => self.coordinate_display_name(&current).await,
        };

        Ok(AggregatedWeather { display_name, current, forecast, daily, hourly, alerts })
    }

    /// Name for a coordinate query: the provider's own name, or a reverse lookup
    /// when the provider left it blank. Falls back to the coordinate itself.
    async fn coordinate_display_name(&self, current: &CurrentConditions) -> String {
        if !current.name.trim().is_empty() {
            return current.name.clone();
        }

        let Some(coord) = current.coordinate else {
            return "Unknown location".to_string();
        };

        match resolver::reverse(self.provider.as_ref(), coord).await {
            Ok(name) => name,
            Err(e) => {
                warn!(%coord, error = %e, "Reverse geocoding failed");
                coord.to_string()
            }
        }
    }
}
