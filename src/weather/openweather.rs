//! OpenWeatherMap client
//!
//! Blocking HTTP client for the `data/2.5` and `geo/1.0` endpoints. Every
//! request is attempted once; a non-success status becomes an
//! [`AssistantError::Api`] carrying the provider's own message.

use super::WeatherProvider;
use crate::config::{WEATHER_KEY_VAR, WeatherConfig};
use crate::models::{AirQualityReading, Coordinates, WeatherSnapshot};
use crate::{AssistantError, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

const CURRENT_ENDPOINT: &str = "data/2.5/weather";
const FORECAST_ENDPOINT: &str = "data/2.5/forecast";
const AIR_POLLUTION_ENDPOINT: &str = "data/2.5/air_pollution";
const AIR_HISTORY_ENDPOINT: &str = "data/2.5/air_pollution/history";
const UVI_ENDPOINT: &str = "data/2.5/uvi";
const GEOCODING_ENDPOINT: &str = "geo/1.0/direct";

/// The forecast endpoint returns one point every three hours
const POINTS_PER_DAY: u32 = 8;

/// Weather API client for OpenWeatherMap
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    country_code: String,
    country_name: String,
}

impl OpenWeatherClient {
    /// Create a new client; fails when no API key is configured
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AssistantError::config(format!("{WEATHER_KEY_VAR} environment variable is not set"))
            })?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("skyroute/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_code: config.country_code.clone(),
            country_name: config.country_name.clone(),
        })
    }

    /// Candidate names tried in order when geocoding, without duplicates
    #[must_use]
    pub fn location_variations(&self, location: &str) -> Vec<String> {
        let candidates = [
            location.to_string(),
            format!("{location},{}", self.country_code),
            format!("{location},{}", self.country_name),
            title_case(location),
            location.to_uppercase(),
        ];

        let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }
        unique
    }

    /// Build the request URL; the key is appended last so it can be cut from logs
    fn endpoint_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}/{}?", self.base_url, endpoint);
        for (name, value) in params {
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            url.push('&');
        }
        url.push_str("appid=");
        url.push_str(&urlencoding::encode(&self.api_key));
        url
    }

    /// Issue one GET and decode the JSON body
    #[instrument(skip(self, params))]
    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint_url(endpoint, params);
        debug!("OpenWeatherMap request: {}", redact_key(&url));

        let start_time = Instant::now();
        let response = self.client.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;
        let duration = start_time.elapsed();

        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            duration.as_secs_f64()
        );
        if duration.as_secs() > 5 {
            warn!("Slow API response detected: {:.3}s", duration.as_secs_f64());
        }

        if !status.is_success() {
            let message = serde_json::from_str::<owm::ErrorBody>(&body)
                .ok()
                .and_then(|error_body| error_body.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!("{} returned {}: {}", endpoint, status, message);
            return Err(AssistantError::api(message));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse {} response: {}", endpoint, e);
            AssistantError::api(format!("Invalid data received from {endpoint}: {e}"))
        })
    }

    fn coordinate_params(coordinates: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
        ]
    }

    fn geocode_candidate(&self, candidate: &str) -> Result<Option<Coordinates>> {
        let entries: Vec<owm::GeoEntry> = self.get_json(
            GEOCODING_ENDPOINT,
            &[("q", candidate.to_string()), ("limit", "1".to_string())],
        )?;
        Ok(entries
            .first()
            .map(|entry| Coordinates::new(entry.lat, entry.lon)))
    }

    fn weather_coordinates(&self, candidate: &str) -> Result<Coordinates> {
        let response: owm::CoordinatesOnly =
            self.get_json(CURRENT_ENDPOINT, &[("q", candidate.to_string())])?;
        Ok(Coordinates::new(response.coord.lat, response.coord.lon))
    }
}

impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    fn current_weather(&self, location: &str) -> Result<WeatherSnapshot> {
        info!("Getting current weather for '{}'", location);
        let response: owm::CurrentResponse = self.get_json(
            CURRENT_ENDPOINT,
            &[("q", location.to_string()), ("units", "metric".to_string())],
        )?;
        Ok(response.into_snapshot(location))
    }

    #[instrument(skip(self))]
    fn forecast(&self, location: &str, days: u32) -> Result<Vec<WeatherSnapshot>> {
        let coordinates = self.resolve_coordinates(location)?;
        info!("Getting {}-day forecast for '{}' at {}", days, location, coordinates);

        let mut params = Self::coordinate_params(coordinates);
        params.push(("units", "metric".to_string()));
        params.push(("cnt", (days * POINTS_PER_DAY).to_string()));

        let response: owm::ForecastResponse = self.get_json(FORECAST_ENDPOINT, &params)?;
        let forecast: Vec<WeatherSnapshot> = response
            .list
            .into_iter()
            .map(|item| item.into_snapshot(location))
            .collect();

        info!("Retrieved forecast with {} data points", forecast.len());
        Ok(forecast)
    }

    #[instrument(skip(self))]
    fn air_quality(&self, location: &str) -> Result<AirQualityReading> {
        let coordinates = self.resolve_coordinates(location)?;
        info!("Getting air quality for '{}' at {}", location, coordinates);

        let response: owm::AirPollutionResponse =
            self.get_json(AIR_POLLUTION_ENDPOINT, &Self::coordinate_params(coordinates))?;
        response
            .into_reading()
            .ok_or_else(|| AssistantError::api(format!("No air quality data for {location}")))
    }

    #[instrument(skip(self))]
    fn uv_index(&self, coordinates: Coordinates) -> Result<f64> {
        let response: owm::UviResponse =
            self.get_json(UVI_ENDPOINT, &Self::coordinate_params(coordinates))?;
        Ok(response.value)
    }

    #[instrument(skip(self))]
    fn resolve_coordinates(&self, location: &str) -> Result<Coordinates> {
        let variations = self.location_variations(location);

        for candidate in &variations {
            match self.geocode_candidate(candidate) {
                Ok(Some(coordinates)) => {
                    debug!("Geocoded '{}' as '{}' -> {}", location, candidate, coordinates);
                    return Ok(coordinates);
                }
                Ok(None) => debug!("No geocoding result for '{}'", candidate),
                Err(e) => debug!("Geocoding '{}' failed: {}", candidate, e),
            }
        }

        for candidate in &variations {
            match self.weather_coordinates(candidate) {
                Ok(coordinates) => {
                    debug!(
                        "Resolved '{}' via weather lookup of '{}' -> {}",
                        location, candidate, coordinates
                    );
                    return Ok(coordinates);
                }
                Err(e) => debug!("Weather lookup for '{}' failed: {}", candidate, e),
            }
        }

        warn!("Could not resolve coordinates for '{}'", location);
        Err(AssistantError::location_not_found(location))
    }

    #[instrument(skip(self))]
    fn air_quality_on(&self, coordinates: Coordinates, at: DateTime<Utc>) -> Result<AirQualityReading> {
        let timestamp = at.timestamp().to_string();
        let mut params = Self::coordinate_params(coordinates);
        params.push(("start", timestamp.clone()));
        params.push(("end", timestamp));

        let response: owm::AirPollutionResponse = self.get_json(AIR_HISTORY_ENDPOINT, &params)?;
        response
            .into_reading()
            .ok_or_else(|| AssistantError::api(format!("No air quality data for {}", at.date_naive())))
    }
}

/// Upper-case the first letter of every word and lower-case the rest
fn title_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut previous_is_letter = false;
    for c in input.chars() {
        if previous_is_letter {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    result
}

fn redact_key(url: &str) -> &str {
    url.split("appid=").next().unwrap_or(url)
}

/// OpenWeatherMap response structures
mod owm {
    use crate::models::{AirQualityReading, WeatherSnapshot};
    use chrono::{DateTime, Utc};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize)]
    pub struct ErrorBody {
        pub message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Coord {
        pub lat: f64,
        pub lon: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct CoordinatesOnly {
        pub coord: Coord,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainReadings {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: u8,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
        pub icon: String,
    }

    /// Body of `data/2.5/weather`
    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub main: MainReadings,
        pub wind: Wind,
        pub weather: Vec<Condition>,
        pub dt: i64,
    }

    /// Body of `data/2.5/forecast`
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<ForecastItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        pub main: MainReadings,
        pub wind: Wind,
        pub weather: Vec<Condition>,
        pub dt: i64,
    }

    /// Body of `data/2.5/air_pollution` and its history variant
    #[derive(Debug, Deserialize)]
    pub struct AirPollutionResponse {
        pub list: Vec<AirPollutionItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AirPollutionItem {
        pub main: AqiReading,
        pub components: BTreeMap<String, f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AqiReading {
        pub aqi: u32,
    }

    #[derive(Debug, Deserialize)]
    pub struct UviResponse {
        pub value: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeoEntry {
        pub lat: f64,
        pub lon: f64,
    }

    fn build_snapshot(
        main: MainReadings,
        wind: Wind,
        weather: Vec<Condition>,
        dt: i64,
        location: &str,
    ) -> WeatherSnapshot {
        let (description, icon) = weather
            .into_iter()
            .next()
            .map(|condition| (condition.description, condition.icon))
            .unwrap_or_else(|| ("unknown".to_string(), String::new()));

        WeatherSnapshot {
            temperature: main.temp,
            feels_like: main.feels_like,
            humidity: main.humidity,
            wind_speed: wind.speed,
            description,
            icon,
            timestamp: DateTime::from_timestamp(dt, 0).unwrap_or_else(Utc::now),
            location: location.to_string(),
            uv_index: None,
            air_quality: None,
        }
    }

    impl CurrentResponse {
        pub fn into_snapshot(self, location: &str) -> WeatherSnapshot {
            build_snapshot(self.main, self.wind, self.weather, self.dt, location)
        }
    }

    impl ForecastItem {
        pub fn into_snapshot(self, location: &str) -> WeatherSnapshot {
            build_snapshot(self.main, self.wind, self.weather, self.dt, location)
        }
    }

    impl AirPollutionResponse {
        pub fn into_reading(self) -> Option<AirQualityReading> {
            self.list.into_iter().next().map(|item| AirQualityReading {
                aqi: item.main.aqi,
                components: item.components,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client() -> OpenWeatherClient {
        let config = WeatherConfig {
            api_key: Some("secret_key".to_string()),
            ..WeatherConfig::default()
        };
        OpenWeatherClient::new(&config).unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let err = OpenWeatherClient::new(&WeatherConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AssistantError::Config { .. }));
        assert!(err.to_string().contains(WEATHER_KEY_VAR));
    }

    #[test]
    fn test_location_variations_order() {
        assert_eq!(
            client().location_variations("dera ghazi khan"),
            vec![
                "dera ghazi khan",
                "dera ghazi khan,PK",
                "dera ghazi khan,Pakistan",
                "Dera Ghazi Khan",
                "DERA GHAZI KHAN",
            ]
        );
    }

    #[test]
    fn test_location_variations_skip_duplicates() {
        assert_eq!(
            client().location_variations("Lahore"),
            vec!["Lahore", "Lahore,PK", "Lahore,Pakistan", "LAHORE"]
        );
    }

    #[rstest]
    #[case("karachi", "Karachi")]
    #[case("NEW YORK", "New York")]
    #[case("o'hare", "O'Hare")]
    #[case("", "")]
    fn test_title_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(title_case(input), expected);
    }

    #[test]
    fn test_endpoint_url_encodes_params_and_key_is_last() {
        let url = client().endpoint_url(
            CURRENT_ENDPOINT,
            &[("q", "Lahore,Pakistan".to_string()), ("units", "metric".to_string())],
        );
        assert_eq!(
            url,
            "https://api.openweathermap.org/data/2.5/weather?q=Lahore%2CPakistan&units=metric&appid=secret_key"
        );
        assert!(!redact_key(&url).contains("secret_key"));
    }

    #[test]
    fn test_parse_current_response() {
        let body = r#"{
            "coord": {"lon": 74.3436, "lat": 31.5497},
            "weather": [{"id": 721, "main": "Haze", "description": "haze", "icon": "50d"}],
            "main": {"temp": 31.99, "feels_like": 33.2, "temp_min": 31.99, "temp_max": 31.99, "pressure": 1012, "humidity": 48},
            "wind": {"speed": 2.57, "deg": 300},
            "dt": 1760518800,
            "name": "Lahore",
            "cod": 200
        }"#;
        let response: owm::CurrentResponse = serde_json::from_str(body).unwrap();
        let snapshot = response.into_snapshot("Lahore");

        assert_eq!(snapshot.location, "Lahore");
        assert_eq!(snapshot.temperature, 31.99);
        assert_eq!(snapshot.humidity, 48);
        assert_eq!(snapshot.description, "haze");
        assert_eq!(snapshot.icon, "50d");
        assert_eq!(snapshot.timestamp.timestamp(), 1_760_518_800);
        assert!(snapshot.uv_index.is_none());
    }

    #[test]
    fn test_parse_forecast_response() {
        let body = r#"{
            "cod": "200",
            "cnt": 2,
            "list": [
                {"dt": 1760526000, "main": {"temp": 29.1, "feels_like": 30.0, "humidity": 55}, "weather": [{"description": "few clouds", "icon": "02d"}], "wind": {"speed": 4.1}},
                {"dt": 1760536800, "main": {"temp": 26.4, "feels_like": 26.4, "humidity": 61}, "weather": [], "wind": {"speed": 3.0}}
            ]
        }"#;
        let response: owm::ForecastResponse = serde_json::from_str(body).unwrap();
        let points: Vec<_> = response
            .list
            .into_iter()
            .map(|item| item.into_snapshot("Karachi"))
            .collect();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].description, "few clouds");
        assert_eq!(points[1].description, "unknown");
        assert!(points.iter().all(|p| p.location == "Karachi"));
    }

    #[test]
    fn test_parse_air_pollution_response() {
        let body = r#"{
            "coord": {"lon": 73.05, "lat": 33.68},
            "list": [{"main": {"aqi": 4}, "components": {"co": 453.95, "no2": 21.25, "pm2_5": 61.3}, "dt": 1760518800}]
        }"#;
        let response: owm::AirPollutionResponse = serde_json::from_str(body).unwrap();
        let reading = response.into_reading().unwrap();
        assert_eq!(reading.aqi, 4);
        assert_eq!(reading.components.len(), 3);
        assert_eq!(reading.components["pm2_5"], 61.3);
    }

    #[test]
    fn test_empty_air_pollution_list_has_no_reading() {
        let response: owm::AirPollutionResponse = serde_json::from_str(r#"{"list": []}"#).unwrap();
        assert!(response.into_reading().is_none());
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"cod": "404", "message": "city not found"}"#;
        let error_body: owm::ErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(error_body.message.as_deref(), Some("city not found"));
    }
}
