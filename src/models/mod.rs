//! Data models for the skyroute assistant
//!
//! This module contains the core domain models organized by concern:
//! - Location: resolved geographic coordinates
//! - Weather: current conditions and forecast points
//! - Air quality: AQI readings and day-by-day history

pub mod air_quality;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use air_quality::{AirQualityReading, DailyAirQuality, HistoricalDay};
pub use location::Coordinates;
pub use weather::WeatherSnapshot;
