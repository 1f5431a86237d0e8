//! Rule-based advisories derived from current conditions
//!
//! Every function here is total: any snapshot produces a (possibly empty)
//! list of advisory strings. Thresholds use the snapshot's own units, °C for
//! temperature and the provider's wind speed.

use crate::models::WeatherSnapshot;
use serde::Serialize;
use std::fmt;

/// Above this temperature: swimming, light clothing
pub const WARM_THRESHOLD: f64 = 25.0;
/// From this temperature up to [`WARM_THRESHOLD`]: hiking, medium clothing
pub const MILD_THRESHOLD: f64 = 15.0;
/// Above this temperature: heat alert
pub const HEAT_THRESHOLD: f64 = 30.0;
/// Below this temperature: freezing alerts and travel delays
pub const FREEZING_THRESHOLD: f64 = 0.0;
/// Above this wind speed: wind-resistant clothing
pub const BREEZY_WIND: f64 = 15.0;
/// Above this wind speed: balance warning
pub const HIGH_WIND: f64 = 20.0;
/// Above this wind speed: flight delays
pub const FLIGHT_WIND: f64 = 30.0;
/// Above this UV index: sunscreen advisory
pub const HIGH_UV: f64 = 6.0;
/// Above this AQI: limit outdoor activity
pub const POOR_AQI: u32 = 100;

const NORMAL: &str = "Normal";

/// Expected disruption to getting around
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelImpact {
    pub road_conditions: String,
    pub flight_impact: String,
    pub public_transport: String,
}

impl Default for TravelImpact {
    fn default() -> Self {
        Self {
            road_conditions: NORMAL.to_string(),
            flight_impact: NORMAL.to_string(),
            public_transport: NORMAL.to_string(),
        }
    }
}

impl fmt::Display for TravelImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  - Road conditions: {}", self.road_conditions)?;
        writeln!(f, "  - Flights: {}", self.flight_impact)?;
        write!(f, "  - Public transport: {}", self.public_transport)
    }
}

/// All advisories for one location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub outdoor_activities: Vec<String>,
    pub health_alerts: Vec<String>,
    pub clothing: Vec<String>,
    pub travel_impact: TravelImpact,
}

impl Recommendations {
    /// Run every rule set over the snapshot and its optional UV/AQI readings
    #[must_use]
    pub fn derive(weather: &WeatherSnapshot) -> Self {
        Self {
            outdoor_activities: outdoor_activities(weather),
            health_alerts: health_alerts(weather, weather.uv_index, weather.air_quality),
            clothing: clothing(weather),
            travel_impact: travel_impact(weather),
        }
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, items: &[String]) -> fmt::Result {
    writeln!(f, "{title}:")?;
    if items.is_empty() {
        writeln!(f, "  - None")
    } else {
        items.iter().try_for_each(|item| writeln!(f, "  - {item}"))
    }
}

impl fmt::Display for Recommendations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_section(f, "Outdoor activities", &self.outdoor_activities)?;
        write_section(f, "Health alerts", &self.health_alerts)?;
        write_section(f, "Clothing", &self.clothing)?;
        writeln!(f, "Travel impact:")?;
        write!(f, "{}", self.travel_impact)
    }
}

/// Activity suggestions from temperature, wind and rain
#[must_use]
pub fn outdoor_activities(weather: &WeatherSnapshot) -> Vec<String> {
    let mut recommendations = Vec::new();
    let t = weather.temperature;

    if t > WARM_THRESHOLD {
        recommendations.push("Great day for swimming or beach activities".to_string());
    } else if (MILD_THRESHOLD..=WARM_THRESHOLD).contains(&t) {
        recommendations.push("Perfect for hiking or outdoor sports".to_string());
    } else if t < MILD_THRESHOLD {
        recommendations
            .push("Consider indoor activities or dress warmly for outdoor activities".to_string());
    }

    if weather.wind_speed > HIGH_WIND {
        recommendations.push("High winds - avoid activities that require balance".to_string());
    }

    if weather.is_rainy() {
        recommendations.push("Rain expected - consider indoor activities".to_string());
    }

    recommendations
}

/// Health alerts from UV, air quality and temperature extremes
#[must_use]
pub fn health_alerts(weather: &WeatherSnapshot, uv_index: Option<f64>, aqi: Option<u32>) -> Vec<String> {
    let mut alerts = Vec::new();

    if let Some(uv) = uv_index.filter(|uv| *uv > HIGH_UV) {
        alerts.push(format!(
            "High UV index ({uv}) - use sunscreen and limit sun exposure"
        ));
    }

    if let Some(aqi) = aqi.filter(|aqi| *aqi > POOR_AQI) {
        alerts.push(format!(
            "Poor air quality (AQI: {aqi}) - limit outdoor activities"
        ));
    }

    if weather.temperature > HEAT_THRESHOLD {
        alerts.push("High temperature - stay hydrated and avoid strenuous activities".to_string());
    }

    if weather.temperature < FREEZING_THRESHOLD {
        alerts.push("Freezing temperatures - dress warmly and watch for ice".to_string());
    }

    alerts
}

/// Clothing advice from temperature, rain and wind
#[must_use]
pub fn clothing(weather: &WeatherSnapshot) -> Vec<String> {
    let mut recommendations = Vec::new();
    let t = weather.temperature;

    let layer = if t > WARM_THRESHOLD {
        "Light clothing recommended"
    } else if (MILD_THRESHOLD..=WARM_THRESHOLD).contains(&t) {
        "Light to medium clothing appropriate"
    } else if (FREEZING_THRESHOLD..MILD_THRESHOLD).contains(&t) {
        "Warm clothing recommended"
    } else {
        "Heavy winter clothing required"
    };
    recommendations.push(layer.to_string());

    if weather.is_rainy() {
        recommendations.push("Bring rain gear or umbrella".to_string());
    }

    if weather.wind_speed > BREEZY_WIND {
        recommendations.push("Windy conditions - consider wind-resistant clothing".to_string());
    }

    recommendations
}

/// Road, flight and public transport impact
#[must_use]
pub fn travel_impact(weather: &WeatherSnapshot) -> TravelImpact {
    let mut impact = TravelImpact::default();

    if weather.is_rainy() {
        impact.road_conditions = "Wet roads - allow extra travel time".to_string();
        impact.flight_impact = "Possible delays due to rain".to_string();
    }

    if weather.wind_speed > FLIGHT_WIND {
        impact.flight_impact = "Possible delays due to high winds".to_string();
    }

    // freezing overrides the wet-road advice
    if weather.temperature < FREEZING_THRESHOLD {
        impact.road_conditions = "Possible ice - drive with caution".to_string();
        impact.public_transport = "Possible delays due to cold weather".to_string();
    }

    impact
}
