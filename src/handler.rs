//! Weather query handling: turns questions and commands into answers

use crate::{AssistantError, Result};
use crate::extraction::extract_location;
use crate::models::WeatherSnapshot;
use crate::models::air_quality::aqi_label;
use crate::recommendations::{Recommendations, travel_impact};
use crate::weather::WeatherProvider;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One calendar day of forecast points, condensed
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Most frequent description; the earliest wins a tie
    pub description: String,
}

/// Answers weather questions using a [`WeatherProvider`]
pub struct WeatherQueryHandler<P> {
    provider: P,
}

impl<P: WeatherProvider> WeatherQueryHandler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Answer a free-text question from current conditions
    pub fn try_answer(&self, query: &str) -> Result<String> {
        let location = extract_location(query);
        info!("Answering weather query for '{}'", location);

        let weather = self.provider.current_weather(location)?;
        Ok(format_answer(query, location, &weather))
    }

    /// Like [`Self::try_answer`], with errors turned into an apology
    pub fn answer(&self, query: &str) -> String {
        self.try_answer(query).unwrap_or_else(|e| {
            warn!("Weather query failed: {}", e);
            apology(&e)
        })
    }

    pub fn current_report(&self, location: &str) -> Result<String> {
        let weather = self.provider.current_weather(location)?;
        Ok(format!(
            "Current weather in {location}: {}, Temperature: {} (feels like {:.1}°C), Humidity: {}%, Wind Speed: {}.",
            weather.description,
            weather.format_temperature(),
            weather.feels_like,
            weather.humidity,
            weather.format_wind()
        ))
    }

    pub fn forecast_report(&self, location: &str, days: u32) -> Result<String> {
        let points = self.provider.forecast(location, days)?;
        let summaries = summarise_forecast(&points);
        if summaries.is_empty() {
            return Ok(format!("No forecast data is available for {location}."));
        }

        let mut report = format!("{days}-day forecast for {location}:");
        for day in summaries {
            report.push_str(&format!(
                "\n  {}: {:.1}°C to {:.1}°C, {}",
                day.date.format("%a %Y-%m-%d"),
                day.min_temperature,
                day.max_temperature,
                day.description
            ));
        }
        Ok(report)
    }

    pub fn air_quality_report(&self, location: &str) -> Result<String> {
        let reading = self.provider.air_quality(location)?;
        let mut report = format!(
            "Air quality in {location}: AQI {} ({}).",
            reading.aqi,
            reading.label()
        );
        if !reading.components.is_empty() {
            report.push_str(&format!(
                " Components (μg/m³): {}.",
                reading.format_components()
            ));
        }
        Ok(report)
    }

    pub fn air_quality_history_report(&self, location: &str, days: u32) -> Result<String> {
        let history = self.provider.historical_air_quality(location, days)?;
        if history.is_empty() {
            return Ok(format!("No air quality history is available for {location}."));
        }

        let mut report = format!(
            "Air quality history for {location} ({} of {days} days available):",
            history.len()
        );
        for day in history {
            report.push_str(&format!(
                "\n  {}: AQI {} ({})",
                day.date,
                day.reading.aqi,
                aqi_label(day.reading.aqi)
            ));
        }
        Ok(report)
    }

    /// Current conditions plus best-effort AQI and UV readings, with advisories
    pub fn recommendations(&self, location: &str) -> Result<(WeatherSnapshot, Recommendations)> {
        let weather = self.provider.current_weather(location)?;

        let aqi = match self.provider.air_quality(location) {
            Ok(reading) => Some(reading.aqi),
            Err(e) => {
                warn!("Air quality unavailable for '{}': {}", location, e);
                None
            }
        };

        let uv_index = match self
            .provider
            .resolve_coordinates(location)
            .and_then(|coordinates| self.provider.uv_index(coordinates))
        {
            Ok(uv) => Some(uv),
            Err(e) => {
                warn!("UV index unavailable for '{}': {}", location, e);
                None
            }
        };

        let weather = weather.with_air_quality(aqi).with_uv_index(uv_index);
        let recommendations = Recommendations::derive(&weather);
        Ok((weather, recommendations))
    }

    pub fn recommendation_report(&self, location: &str) -> Result<String> {
        let (weather, recommendations) = self.recommendations(location)?;
        Ok(format!(
            "Recommendations for {location} ({}, {}):\n{recommendations}",
            weather.description,
            weather.format_temperature()
        ))
    }

    pub fn travel_report(&self, location: &str) -> Result<String> {
        let weather = self.provider.current_weather(location)?;
        Ok(format!(
            "Travel impact in {location} ({}, {}):\n{}",
            weather.description,
            weather.format_temperature(),
            travel_impact(&weather)
        ))
    }
}

/// Reply text for a free-text question that could not be answered
#[must_use]
pub fn apology(error: &AssistantError) -> String {
    format!("Sorry, I encountered an error: {error}. Please try rephrasing your question.")
}

/// Templated sentence chosen by what the query asks about
#[must_use]
pub fn format_answer(query: &str, location: &str, weather: &WeatherSnapshot) -> String {
    let query = query.to_lowercase();
    if query.contains("temperature") {
        format!(
            "The current temperature in {location} is {}.",
            weather.format_temperature()
        )
    } else if query.contains("rain") {
        format!(
            "In {location}, the current conditions are {}.",
            weather.description
        )
    } else {
        format!(
            "Current weather in {location}: {}, Temperature: {}, Humidity: {}%, Wind Speed: {}.",
            weather.description,
            weather.format_temperature(),
            weather.humidity,
            weather.format_wind()
        )
    }
}

/// Group forecast points by calendar date
#[must_use]
pub fn summarise_forecast(points: &[WeatherSnapshot]) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, Vec<&WeatherSnapshot>> = BTreeMap::new();
    for point in points {
        days.entry(point.timestamp.date_naive())
            .or_default()
            .push(point);
    }

    days.into_iter()
        .map(|(date, points)| {
            let min_temperature = points
                .iter()
                .map(|p| p.temperature)
                .fold(f64::INFINITY, f64::min);
            let max_temperature = points
                .iter()
                .map(|p| p.temperature)
                .fold(f64::NEG_INFINITY, f64::max);

            DaySummary {
                date,
                min_temperature,
                max_temperature,
                description: dominant_description(&points),
            }
        })
        .collect()
}

fn dominant_description(points: &[&WeatherSnapshot]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for point in points {
        let description = point.description.as_str();
        if let Some(entry) = counts.iter_mut().find(|entry| entry.0 == description) {
            entry.1 += 1;
        } else {
            counts.push((description, 1));
        }
    }

    // max_by_key keeps the last maximum, so scan in reverse to prefer the earliest
    counts
        .iter()
        .rev()
        .max_by_key(|entry| entry.1)
        .map(|entry| entry.0.to_string())
        .unwrap_or_default()
}
