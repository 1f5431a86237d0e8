//! Weather data access
//!
//! [`WeatherProvider`] is the seam between the query handler and the remote
//! weather service. [`OpenWeatherClient`] is the production implementation.

use crate::Result;
use crate::models::{AirQualityReading, Coordinates, DailyAirQuality, HistoricalDay, WeatherSnapshot};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Remote weather data operations
pub trait WeatherProvider {
    /// Current conditions for a location name
    fn current_weather(&self, location: &str) -> Result<WeatherSnapshot>;

    /// Forecast points (eight per day) for the next `days` days
    fn forecast(&self, location: &str, days: u32) -> Result<Vec<WeatherSnapshot>>;

    /// Current air quality for a location name
    fn air_quality(&self, location: &str) -> Result<AirQualityReading>;

    /// UV index at the given coordinates
    fn uv_index(&self, coordinates: Coordinates) -> Result<f64>;

    /// Geocode a location name
    fn resolve_coordinates(&self, location: &str) -> Result<Coordinates>;

    /// Air quality recorded at one point in the past
    fn air_quality_on(&self, coordinates: Coordinates, at: DateTime<Utc>)
    -> Result<AirQualityReading>;

    /// One tagged outcome per requested day, most recent first.
    ///
    /// Only coordinate resolution can fail the whole call; a failing day is
    /// recorded and the remaining days are still requested.
    fn historical_air_quality_by_day(&self, location: &str, days: u32) -> Result<Vec<HistoricalDay>> {
        let coordinates = self.resolve_coordinates(location)?;
        Ok(collect_history(self, coordinates, days, Utc::now()))
    }

    /// Successful days of air quality history; failed days are omitted
    fn historical_air_quality(&self, location: &str, days: u32) -> Result<Vec<DailyAirQuality>> {
        let history = self.historical_air_quality_by_day(location, days)?;
        Ok(history
            .into_iter()
            .filter_map(HistoricalDay::into_success)
            .collect())
    }
}

/// Query each day offset `0..days` back from `now` exactly once
pub fn collect_history<P>(
    provider: &P,
    coordinates: Coordinates,
    days: u32,
    now: DateTime<Utc>,
) -> Vec<HistoricalDay>
where
    P: WeatherProvider + ?Sized,
{
    let history: Vec<HistoricalDay> = (0..days)
        .map(|offset| {
            let at = now - Duration::days(i64::from(offset));
            let outcome = provider.air_quality_on(coordinates, at);
            if let Err(e) = &outcome {
                debug!("Skipping air quality for {}: {}", at.date_naive(), e);
            }
            HistoricalDay {
                date: at.date_naive(),
                outcome,
            }
        })
        .collect();

    info!(
        "Collected air quality history: {} of {} days available",
        history.iter().filter(|day| day.outcome.is_ok()).count(),
        days
    );

    history
}
