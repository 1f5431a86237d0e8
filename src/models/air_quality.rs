//! Air quality readings and day-by-day history

use crate::AssistantError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One air quality measurement
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQualityReading {
    /// Provider AQI on a 1 (good) to 5 (very poor) scale
    pub aqi: u32,
    /// Pollutant concentrations in μg/m³, keyed by component name
    pub components: BTreeMap<String, f64>,
}

impl AirQualityReading {
    /// Human label for the provider AQI scale
    #[must_use]
    pub fn label(&self) -> &'static str {
        aqi_label(self.aqi)
    }

    /// Components formatted as `name value` pairs
    #[must_use]
    pub fn format_components(&self) -> String {
        self.components
            .iter()
            .map(|(name, value)| format!("{name} {value:.1}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Convert a provider AQI to a human-readable label
#[must_use]
pub fn aqi_label(aqi: u32) -> &'static str {
    match aqi {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "Unknown",
    }
}

/// Outcome of one requested day of air quality history
#[derive(Debug)]
pub struct HistoricalDay {
    /// Calendar date that was queried
    pub date: NaiveDate,
    /// Reading, or the error that day's request produced
    pub outcome: Result<AirQualityReading, AssistantError>,
}

impl HistoricalDay {
    /// Keep the day only if its request succeeded
    #[must_use]
    pub fn into_success(self) -> Option<DailyAirQuality> {
        self.outcome.ok().map(|reading| DailyAirQuality {
            date: self.date,
            reading,
        })
    }
}

/// A successful day of air quality history
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyAirQuality {
    pub date: NaiveDate,
    pub reading: AirQualityReading,
}
