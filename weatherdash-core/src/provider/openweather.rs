use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::ProviderSettings,
    error::WeatherError,
    model::{Alert, Coordinate, CurrentConditions, ForecastSeries, ObservationPoint, PlaceQuery},
};

use super::WeatherProvider;

const LANGUAGE: &str = "en";
const UNITS: &str = "metric";

/// OpenWeatherMap gateway.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
    geo_base_url: String,
}

impl OpenWeatherProvider {
    pub fn with_settings(api_key: String, settings: &ProviderSettings) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            geo_base_url: settings.geo_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("appid", self.api_key.clone()),
            ("lang", LANGUAGE.to_string()),
            ("units", UNITS.to_string()),
        ]
    }

    fn place_params(&self, query: &PlaceQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            PlaceQuery::Name(name) => vec![("q", name.trim().to_string())],
            PlaceQuery::Coordinates(coord) => coord_params(*coord),
        };
        params.extend(self.common_params());
        params
    }

    /// GET `url` and decode the JSON body, mapping failures onto [`WeatherError`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&'static str, String)],
        what: &'static str,
        place: &str,
    ) -> Result<T, WeatherError> {
        tracing::debug!(url, what, place, "OpenWeather request");

        let res = self.http.get(url).query(params).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                WeatherError::NetworkUnavailable { target: place.to_string() }
            } else {
                // The URL carries the API key.
                WeatherError::Unknown {
                    what,
                    target: place.to_string(),
                    detail: e.without_url().to_string(),
                }
            }
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| WeatherError::Unknown {
            what,
            target: place.to_string(),
            detail: format!("failed to read response body: {}", e.without_url()),
        })?;

        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(WeatherError::NotFound { place: place.to_string() });
            }
            StatusCode::UNAUTHORIZED => return Err(WeatherError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(WeatherError::RateLimited),
            s => {
                return Err(WeatherError::Unknown {
                    what,
                    target: place.to_string(),
                    detail: format!("status {}: {}", s, truncate_body(&body)),
                });
            }
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::Unknown {
            what,
            target: place.to_string(),
            detail: format!("unexpected response: {e}"),
        })
    }

    async fn fetch_alerts(&self, coordinate: Coordinate) -> Result<Vec<Alert>, WeatherError> {
        let url = format!("{}/onecall", self.base_url);
        let mut params = coord_params(coordinate);
        params.push(("exclude", "current,minutely,hourly,daily".to_string()));
        params.extend(self.common_params());

        let parsed: OwOneCallResponse = self
            .get_json(&url, &params, "weather alerts", &coordinate.to_string())
            .await?;

        parsed
            .alerts
            .into_iter()
            .map(|a| {
                Ok(Alert {
                    event: a.event,
                    source: a.sender_name,
                    start: unix_to_utc(a.start, "weather alerts", coordinate)?,
                    end: unix_to_utc(a.end, "weather alerts", coordinate)?,
                    description: a.description,
                    tags: a.tags,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: Option<OwCoord>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    dt: i64,
    #[serde(default)]
    timezone: i32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAlert {
    #[serde(default)]
    sender_name: String,
    event: String,
    start: i64,
    end: i64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OwOneCallResponse {
    #[serde(default)]
    alerts: Vec<OwAlert>,
}

#[derive(Debug, Deserialize)]
struct OwGeoPlace {
    name: String,
    state: Option<String>,
    country: Option<String>,
}

fn observation(
    time: DateTime<Utc>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    pop: Option<f64>,
) -> ObservationPoint {
    let (condition, description, icon) = weather
        .into_iter()
        .next()
        .map(|w| (w.main, w.description, w.icon))
        .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string(), String::new()));

    ObservationPoint {
        time,
        temperature: main.temp,
        feels_like: main.feels_like,
        humidity: main.humidity,
        pressure: main.pressure,
        wind_speed: wind.speed,
        wind_direction: wind.deg,
        cloud_cover: clouds.all,
        condition,
        description,
        icon,
        precipitation_probability: pop,
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_current(&self, query: &PlaceQuery) -> Result<CurrentConditions, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        let place = query.label();

        let parsed: OwCurrentResponse = self
            .get_json(&url, &self.place_params(query), "weather data", &place)
            .await?;

        let time = DateTime::from_timestamp(parsed.dt, 0).ok_or_else(|| WeatherError::Unknown {
            what: "weather data",
            target: place.clone(),
            detail: format!("invalid observation timestamp {}", parsed.dt),
        })?;

        Ok(CurrentConditions {
            observation: observation(
                time,
                parsed.main,
                parsed.weather,
                parsed.wind,
                parsed.clouds,
                None,
            ),
            name: parsed.name,
            country: parsed.sys.country,
            coordinate: parsed.coord.and_then(|c| Coordinate::new(c.lat, c.lon)),
            utc_offset_secs: parsed.timezone,
        })
    }

    async fn get_forecast(
        &self,
        query: &PlaceQuery,
        horizon_points: usize,
    ) -> Result<ForecastSeries, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        let place = query.label();

        let mut params = self.place_params(query);
        params.push(("cnt", horizon_points.to_string()));

        let parsed: OwForecastResponse =
            self.get_json(&url, &params, "forecast data", &place).await?;

        if parsed.list.is_empty() {
            return Err(WeatherError::Unknown {
                what: "forecast data",
                target: place,
                detail: "response contained no data".to_string(),
            });
        }

        let mut series = parsed
            .list
            .into_iter()
            .take(horizon_points)
            .map(|e| {
                let time = DateTime::from_timestamp(e.dt, 0).ok_or_else(|| WeatherError::Unknown {
                    what: "forecast data",
                    target: place.clone(),
                    detail: format!("invalid forecast timestamp {}", e.dt),
                })?;
                Ok(observation(time, e.main, e.weather, e.wind, e.clouds, e.pop))
            })
            .collect::<Result<ForecastSeries, WeatherError>>()?;

        series.sort_by_key(|p| p.time);
        Ok(series)
    }

    async fn get_alerts(&self, coordinate: Coordinate) -> Vec<Alert> {
        match self.fetch_alerts(coordinate).await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::warn!(
                    %coordinate,
                    error = %e,
                    "Failed to fetch weather alerts, showing none"
                );
                Vec::new()
            }
        }
    }

    async fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<String>, WeatherError> {
        let url = format!("{}/reverse", self.geo_base_url);
        let mut params = coord_params(coordinate);
        params.push(("limit", "1".to_string()));
        params.push(("appid", self.api_key.clone()));

        let places: Vec<OwGeoPlace> = self
            .get_json(&url, &params, "place name", &coordinate.to_string())
            .await?;

        Ok(places.into_iter().next().map(|p| {
            [Some(p.name), p.state, p.country]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        }))
    }
}

fn coord_params(coord: Coordinate) -> Vec<(&'static str, String)> {
    vec![("lat", coord.latitude.to_string()), ("lon", coord.longitude.to_string())]
}

fn unix_to_utc(
    ts: i64,
    what: &'static str,
    coordinate: Coordinate,
) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| WeatherError::Unknown {
        what,
        target: coordinate.to_string(),
        detail: format!("invalid timestamp {ts}"),
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        let settings = ProviderSettings { base_url: server.uri(), geo_base_url: server.uri() };
        OpenWeatherProvider::with_settings("test_key".to_string(), &settings)
    }

    fn current_json() -> serde_json::Value {
        serde_json::json!({
            "coord": {"lon": 118.0819, "lat": 24.4798},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 26.4, "feels_like": 27.1, "pressure": 1009, "humidity": 83},
            "wind": {"speed": 4.1, "deg": 200},
            "clouds": {"all": 75},
            "dt": 1714550400,
            "sys": {"country": "CN"},
            "timezone": 28800,
            "name": "Xiamen",
            "cod": 200
        })
    }

    fn forecast_entry(dt: i64, temp: f64) -> serde_json::Value {
        serde_json::json!({
            "dt": dt,
            "main": {"temp": temp, "feels_like": temp, "pressure": 1010, "humidity": 70},
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
            "clouds": {"all": 0},
            "wind": {"speed": 2.0, "deg": 90},
            "pop": 0.1
        })
    }

    #[tokio::test]
    async fn dropped_connection_error_does_not_expose_api_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for stream in listener.incoming().take(1) {
                drop(stream);
            }
        });

        let base = format!("http://{addr}");
        let settings = ProviderSettings { base_url: base.clone(), geo_base_url: base };
        let provider = OpenWeatherProvider::with_settings("SECRET_KEY_123".to_string(), &settings);

        let err = provider.get_current(&PlaceQuery::Name("Paris".into())).await.unwrap_err();

        assert!(
            matches!(err, WeatherError::Unknown { .. } | WeatherError::NetworkUnavailable { .. }),
            "unexpected error: {err:?}"
        );
        assert!(!err.to_string().contains("SECRET_KEY_123"), "key leaked: {err}");
        assert!(!format!("{err:?}").contains("SECRET_KEY_123"), "key leaked: {err:?}");
    }

    #[tokio::test]
    async fn current_by_name_sends_fixed_locale_and_units() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Xiamen,CN"))
            .and(query_param("appid", "test_key"))
            .and(query_param("lang", "en"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_json()))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let current = provider
            .get_current(&PlaceQuery::Name("Xiamen,CN".into()))
            .await
            .unwrap();

        assert_eq!(current.name, "Xiamen");
        assert_eq!(current.country.as_deref(), Some("CN"));
        assert_eq!(current.utc_offset_secs, 28800);
        assert_eq!(current.coordinate, Coordinate::new(24.4798, 118.0819));
        assert_eq!(current.observation.condition, "Rain");
        assert_eq!(current.observation.icon, "10d");
        assert_eq!(current.observation.cloud_cover, 75);
        assert_eq!(current.observation.time.timestamp(), 1714550400);
    }

    #[tokio::test]
    async fn current_by_coordinates_uses_lat_lon() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "24.48"))
            .and(query_param("lon", "118.09"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_json()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let query = PlaceQuery::coordinates(24.48, 118.09).unwrap();
        assert!(provider.get_current(&query).await.is_ok());
    }

    #[tokio::test]
    async fn missing_coord_is_absent() {
        let server = MockServer::start().await;

        let mut body = current_json();
        body["coord"] = serde_json::json!({"lon": 0.0, "lat": 0.0});

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let current = provider_for(&server)
            .get_current(&PlaceQuery::Name("Nowhere".into()))
            .await
            .unwrap();
        assert!(current.coordinate.is_none());
    }

    #[tokio::test]
    async fn status_codes_map_to_taxonomy() {
        let cases = [
            (404, "not found"),
            (401, "unauthorized"),
            (429, "rate limited"),
            (500, "unknown"),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/weather"))
                .respond_with(ResponseTemplate::new(status).set_body_string("{\"cod\":\"x\"}"))
                .mount(&server)
                .await;

            let err = provider_for(&server)
                .get_current(&PlaceQuery::Name("Atlantis".into()))
                .await
                .unwrap_err();

            let matched = match (&err, expected) {
                (WeatherError::NotFound { place }, "not found") => place == "Atlantis",
                (WeatherError::Unauthorized, "unauthorized") => true,
                (WeatherError::RateLimited, "rate limited") => true,
                (WeatherError::Unknown { target, .. }, "unknown") => target == "Atlantis",
                _ => false,
            };
            assert!(matched, "status {status} produced {err:?}");
        }
    }

    #[tokio::test]
    async fn malformed_body_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .get_current(&PlaceQuery::Name("Paris".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Unknown { .. }));
        assert!(err.to_string().contains("Paris"));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_unavailable() {
        let settings = ProviderSettings {
            base_url: "http://127.0.0.1:1".to_string(),
            geo_base_url: "http://127.0.0.1:1".to_string(),
        };
        let provider = OpenWeatherProvider::with_settings("k".to_string(), &settings);

        let err = provider
            .get_current(&PlaceQuery::Name("Paris".into()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, WeatherError::NetworkUnavailable { ref target } if target == "Paris")
        );
    }

    #[tokio::test]
    async fn forecast_requests_horizon_and_sorts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("cnt", "8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cod": "200",
                "list": [forecast_entry(1714561200, 20.0), forecast_entry(1714550400, 18.0)],
                "city": {"name": "Xiamen", "country": "CN"}
            })))
            .mount(&server)
            .await;

        let series = provider_for(&server)
            .get_hourly_raw(&PlaceQuery::Name("Xiamen".into()))
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].temperature, 18.0);
        assert_eq!(series[1].precipitation_probability, Some(0.1));
    }

    #[tokio::test]
    async fn empty_forecast_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"list": []})))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .get_forecast(&PlaceQuery::Name("Xiamen".into()), 40)
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Unknown { what: "forecast data", .. }));
    }

    #[tokio::test]
    async fn alerts_are_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .and(query_param("exclude", "current,minutely,hourly,daily"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "lat": 24.48, "lon": 118.09,
                "alerts": [{
                    "sender_name": "Xiamen Meteorological Observatory",
                    "event": "Typhoon Warning",
                    "start": 1714550400,
                    "end": 1714636800,
                    "description": "Strong winds expected.",
                    "tags": ["Wind", "Storm"]
                }]
            })))
            .mount(&server)
            .await;

        let alerts = provider_for(&server)
            .get_alerts(Coordinate::new(24.48, 118.09).unwrap())
            .await;

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].event, "Typhoon Warning");
        assert_eq!(alerts[0].source, "Xiamen Meteorological Observatory");
        assert_eq!(alerts[0].tags, vec!["Wind".to_string(), "Storm".to_string()]);
    }

    #[tokio::test]
    async fn alerts_missing_field_is_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"lat": 1.0})))
            .mount(&server)
            .await;

        let alerts = provider_for(&server).get_alerts(Coordinate::new(1.0, 1.0).unwrap()).await;
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn alerts_swallow_errors() {
        for response in [
            ResponseTemplate::new(401),
            ResponseTemplate::new(429),
            ResponseTemplate::new(200).set_body_string("garbage"),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/onecall"))
                .respond_with(response)
                .mount(&server)
                .await;

            let alerts = provider_for(&server).get_alerts(Coordinate::new(1.0, 1.0).unwrap()).await;
            assert!(alerts.is_empty());
        }
    }

    #[tokio::test]
    async fn reverse_geocode_joins_name_parts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "name": "Seattle",
                    "lat": 47.6,
                    "lon": -122.3,
                    "country": "US",
                    "state": "Washington"
                }
            ])))
            .mount(&server)
            .await;

        let name = provider_for(&server)
            .reverse_geocode(Coordinate::new(47.6, -122.3).unwrap())
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("Seattle, Washington, US"));
    }

    #[tokio::test]
    async fn reverse_geocode_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let name = provider_for(&server)
            .reverse_geocode(Coordinate::new(-60.0, -140.0).unwrap())
            .await
            .unwrap();
        assert!(name.is_none());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }
}
