//! End-to-end turns through the assistant with in-memory services

use chrono::{DateTime, Duration, TimeZone, Utc};
use skyroute::models::{AirQualityReading, Coordinates, WeatherSnapshot};
use skyroute::{
    Assistant, AssistantError, CommandDispatcher, Result, SearchProvider, SearchResult,
    TextCompleter, TurnOutcome, WeatherProvider, WeatherQueryHandler,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

const KARACHI: Coordinates = Coordinates {
    latitude: 24.8607,
    longitude: 67.0011,
};

/// Weather service that records every request
#[derive(Clone, Default)]
struct RecordingWeather {
    requests: Rc<RefCell<Vec<String>>>,
}

impl RecordingWeather {
    fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn log(&self, request: String) {
        self.requests.borrow_mut().push(request);
    }

    fn snapshot(location: &str, at: DateTime<Utc>) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 28.6,
            feels_like: 30.1,
            humidity: 62,
            wind_speed: 4.2,
            description: "scattered clouds".to_string(),
            icon: "03d".to_string(),
            timestamp: at,
            location: location.to_string(),
            uv_index: None,
            air_quality: None,
        }
    }
}

impl WeatherProvider for RecordingWeather {
    fn current_weather(&self, location: &str) -> Result<WeatherSnapshot> {
        self.log(format!("current {location}"));
        Ok(Self::snapshot(location, Utc::now()))
    }

    fn forecast(&self, location: &str, days: u32) -> Result<Vec<WeatherSnapshot>> {
        let coordinates = self.resolve_coordinates(location)?;
        self.log(format!("forecast {coordinates} days={days}"));
        let start = Utc.with_ymd_and_hms(2026, 10, 15, 0, 0, 0).unwrap();
        Ok((0..days * 8)
            .map(|i| Self::snapshot(location, start + Duration::hours(i64::from(i) * 3)))
            .collect())
    }

    fn air_quality(&self, location: &str) -> Result<AirQualityReading> {
        self.log(format!("air {location}"));
        Ok(AirQualityReading {
            aqi: 2,
            components: BTreeMap::new(),
        })
    }

    fn uv_index(&self, coordinates: Coordinates) -> Result<f64> {
        self.log(format!("uv {coordinates}"));
        Ok(3.0)
    }

    fn resolve_coordinates(&self, location: &str) -> Result<Coordinates> {
        self.log(format!("geocode {location}"));
        match location {
            "Karachi" => Ok(KARACHI),
            other => Err(AssistantError::location_not_found(other)),
        }
    }

    fn air_quality_on(&self, _coordinates: Coordinates, _at: DateTime<Utc>) -> Result<AirQualityReading> {
        Err(AssistantError::api("history unavailable"))
    }
}

/// Completer that always fails, so every draft is printed unreviewed
struct OfflineModel {
    calls: Rc<RefCell<u32>>,
}

impl TextCompleter for OfflineModel {
    fn complete(&self, _prompt: &str) -> Result<String> {
        *self.calls.borrow_mut() += 1;
        Err(AssistantError::llm("connection refused"))
    }
}

struct NoSearch;

impl SearchProvider for NoSearch {
    fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}

fn session() -> (
    Assistant<RecordingWeather, NoSearch, OfflineModel>,
    RecordingWeather,
    Rc<RefCell<u32>>,
) {
    let weather = RecordingWeather::default();
    let calls = Rc::new(RefCell::new(0));
    let assistant = Assistant::new(
        CommandDispatcher::new(WeatherQueryHandler::new(weather.clone())),
        NoSearch,
        OfflineModel {
            calls: Rc::clone(&calls),
        },
    );
    (assistant, weather, calls)
}

fn reply(outcome: TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Reply(text) => text,
        other => panic!("expected a reply, got {other:?}"),
    }
}

#[test]
fn test_weather_verb_queries_named_city() {
    let (mut assistant, weather, model_calls) = session();

    let text = reply(assistant.handle_line("weather Lahore"));

    assert_eq!(weather.requests(), vec!["current Lahore"]);
    assert!(text.contains("Lahore"));
    assert!(text.chars().any(|c| c.is_ascii_digit()));
    // reviewer was tried once and fell back to the draft
    assert_eq!(*model_calls.borrow(), 1);
    assert!(text.starts_with("Current weather in Lahore"));
}

#[test]
fn test_forecast_verb_uses_resolved_coordinates() {
    let (mut assistant, weather, _) = session();

    let text = reply(assistant.handle_line("forecast Karachi 5"));

    assert_eq!(
        weather.requests(),
        vec!["geocode Karachi", "forecast 24.8607, 67.0011 days=5"]
    );
    assert!(text.starts_with("5-day forecast for Karachi:"));
    assert_eq!(text.lines().count(), 6);
}

#[test]
fn test_natural_phrasing_after_verb() {
    let (mut assistant, weather, _) = session();

    let text = reply(assistant.handle_line("Forecast for Karachi 3"));

    assert_eq!(
        weather.requests(),
        vec!["geocode Karachi", "forecast 24.8607, 67.0011 days=3"]
    );
    assert!(text.starts_with("3-day forecast for Karachi:"));
}

#[test]
fn test_unresolvable_location_is_a_reply_not_a_failure() {
    let (mut assistant, weather, _) = session();

    // unknown places fall back to the default city, which this service cannot geocode
    let text = reply(assistant.handle_line("forecast Atlantis"));
    assert_eq!(weather.requests(), vec!["geocode Islamabad"]);
    assert_eq!(
        text,
        "Sorry, I couldn't complete that request: Could not find coordinates for Islamabad. Please check the location name and try again."
    );

    // the session carries on
    assert!(matches!(assistant.handle_line("help"), TurnOutcome::Reply(_)));
    assert_eq!(assistant.transcript().len(), 2);
}

#[test]
fn test_unknown_verb_is_answered_from_raw_line() {
    let (mut assistant, weather, _) = session();

    let text = reply(assistant.handle_line("temperature Peshawar"));

    assert_eq!(weather.requests(), vec!["current Peshawar"]);
    assert_eq!(text, "The current temperature in Peshawar is 28.6°C.");
}

#[test]
fn test_history_with_every_day_failing_reports_none() {
    let (mut assistant, _, _) = session();
    let text = reply(assistant.handle_line("air Karachi 3"));
    assert_eq!(text, "No air quality history is available for Karachi.");
}

#[test]
fn test_non_weather_question_with_no_results() {
    let (mut assistant, weather, model_calls) = session();

    let text = reply(assistant.handle_line("who wrote the national anthem"));

    assert_eq!(text, "No search results found.");
    assert!(weather.requests().is_empty());
    assert_eq!(*model_calls.borrow(), 0);
}
