//! Weather snapshot model: one observation or forecast point

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weather conditions at one location and point in time
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Provider icon code
    pub icon: String,
    /// Observation or forecast time
    pub timestamp: DateTime<Utc>,
    /// Location name as requested
    pub location: String,
    /// UV index, when it was fetched
    pub uv_index: Option<f64>,
    /// Air quality index, when it was fetched
    pub air_quality: Option<u32>,
}

impl WeatherSnapshot {
    /// Attach a UV index
    #[must_use]
    pub fn with_uv_index(mut self, uv_index: Option<f64>) -> Self {
        self.uv_index = uv_index;
        self
    }

    /// Attach an air quality index
    #[must_use]
    pub fn with_air_quality(mut self, aqi: Option<u32>) -> Self {
        self.air_quality = aqi;
        self
    }

    /// Whether the description mentions rain
    #[must_use]
    pub fn is_rainy(&self) -> bool {
        self.description.to_lowercase().contains("rain")
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format wind speed with unit
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} m/s", self.wind_speed)
    }
}
