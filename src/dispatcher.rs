//! Command verbs mapped onto the weather query handler
//!
//! Input is split on whitespace. The first token selects a verb
//! (case-insensitive), the rest names the location, optionally followed by a
//! day count. Location text goes through the same city extraction as free
//! text, so `weather in Lahore?` asks about Lahore and an unknown place gets
//! the default city. Anything that is not a verb is answered as a free-text
//! question, using the raw line exactly once.

use crate::extraction::{DEFAULT_CITY, resolve_known_city};
use crate::handler::{WeatherQueryHandler, apology};
use crate::weather::WeatherProvider;
use crate::{AssistantError, Result};
use tracing::{info, warn};

/// Verbs the dispatcher understands
pub const VERBS: [&str; 6] = ["weather", "forecast", "air", "recommend", "travel", "help"];

pub const DEFAULT_FORECAST_DAYS: u32 = 3;
/// The forecast endpoint serves at most five days of 3-hour points
pub const MAX_FORECAST_DAYS: u32 = 5;
pub const MAX_HISTORY_DAYS: u32 = 30;

const WEATHER_USAGE: &str = "Usage: weather <location>";
const FORECAST_USAGE: &str = "Usage: forecast <location> [days]";
const AIR_USAGE: &str = "Usage: air <location> [days]";
const RECOMMEND_USAGE: &str = "Usage: recommend <location>";
const TRAVEL_USAGE: &str = "Usage: travel <location>";

pub const HELP_TEXT: &str = "Available commands:
  weather <location>           current conditions
  forecast <location> [days]   daily forecast (default 3 days, at most 5)
  air <location> [days]        air quality now, or over the last days
  recommend <location>         activity, health, clothing and travel advice
  travel <location>            travel impact of the current weather
  help                         show this message
  exit | quit                  leave the assistant
Anything else is answered as a question, e.g. \"Will it rain in Lahore?\"";

/// A parsed verb with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Weather { location: String },
    Forecast { location: String, days: u32 },
    Air { location: String, days: Option<u32> },
    Recommend { location: String },
    Travel { location: String },
    Help,
}

/// Result of reading one input line
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Command(Command),
    /// A known verb without its required arguments
    Usage(&'static str),
    /// Not a verb; answer as free text
    Unrecognised,
}

/// Dispatcher output, tagged by whether it should be reviewed
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Weather data worth polishing before display
    Draft(String),
    /// Help, usage or error text, shown as-is
    Final(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Draft(text) | Reply::Final(text) => text,
        }
    }
}

/// Whether the first token of a line is a dispatcher verb
#[must_use]
pub fn is_verb(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|word| VERBS.contains(&word.to_lowercase().as_str()))
}

/// Parse a line; a malformed day count is a validation error
pub fn parse_command(line: &str) -> Result<Parsed> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Parsed::Unrecognised);
    };
    let args: Vec<&str> = words.collect();

    let parsed = match verb.to_lowercase().as_str() {
        "help" => Parsed::Command(Command::Help),
        "weather" => with_location(&args, WEATHER_USAGE, |location| Command::Weather { location }),
        "recommend" => with_location(&args, RECOMMEND_USAGE, |location| Command::Recommend {
            location,
        }),
        "travel" => with_location(&args, TRAVEL_USAGE, |location| Command::Travel { location }),
        "forecast" => {
            if args.is_empty() {
                return Ok(Parsed::Usage(FORECAST_USAGE));
            }
            let (location, days) = split_days(&args);
            let days = days
                .map(|days| check_days(days, MAX_FORECAST_DAYS))
                .transpose()?
                .unwrap_or(DEFAULT_FORECAST_DAYS);
            Parsed::Command(Command::Forecast { location, days })
        }
        "air" => {
            if args.is_empty() {
                return Ok(Parsed::Usage(AIR_USAGE));
            }
            let (location, days) = split_days(&args);
            let days = days
                .map(|days| check_days(days, MAX_HISTORY_DAYS))
                .transpose()?;
            Parsed::Command(Command::Air { location, days })
        }
        _ => Parsed::Unrecognised,
    };
    Ok(parsed)
}

fn with_location(
    args: &[&str],
    usage: &'static str,
    build: impl FnOnce(String) -> Command,
) -> Parsed {
    if args.is_empty() {
        Parsed::Usage(usage)
    } else {
        Parsed::Command(build(args.join(" ")))
    }
}

/// Split off a trailing all-digit day count, only when a location remains
fn split_days<'a>(args: &[&'a str]) -> (String, Option<&'a str>) {
    match args.split_last() {
        Some((last, rest))
            if !rest.is_empty() && last.chars().all(|c| c.is_ascii_digit()) =>
        {
            (rest.join(" "), Some(*last))
        }
        _ => (args.join(" "), None),
    }
}

fn check_days(raw: &str, max: u32) -> Result<u32> {
    let days: u32 = raw
        .parse()
        .map_err(|_| AssistantError::validation(format!("'{raw}' is not a valid number of days")))?;
    if days == 0 || days > max {
        return Err(AssistantError::validation(format!(
            "days must be between 1 and {max}"
        )));
    }
    Ok(days)
}

/// Routes command lines to the [`WeatherQueryHandler`]
pub struct CommandDispatcher<P> {
    handler: WeatherQueryHandler<P>,
}

impl<P: WeatherProvider> CommandDispatcher<P> {
    pub fn new(handler: WeatherQueryHandler<P>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &WeatherQueryHandler<P> {
        &self.handler
    }

    /// Handle one input line; never fails
    pub fn dispatch(&self, line: &str) -> Reply {
        let command = match parse_command(line) {
            Ok(Parsed::Command(command)) => command,
            Ok(Parsed::Usage(usage)) => return Reply::Final(usage.to_string()),
            Ok(Parsed::Unrecognised) => return self.answer(line),
            Err(e) => return failure(&e),
        };

        info!("Dispatching {:?}", command);
        match self.run(command) {
            Ok(reply) => reply,
            Err(e) => failure(&e),
        }
    }

    /// Free-text answer for the given query; a failed lookup is final text
    pub fn answer(&self, query: &str) -> Reply {
        match self.handler.try_answer(query) {
            Ok(text) => Reply::Draft(text),
            Err(e) => {
                warn!("Weather query failed: {}", e);
                Reply::Final(apology(&e))
            }
        }
    }

    fn run(&self, command: Command) -> Result<Reply> {
        let text = match command {
            Command::Help => return Ok(Reply::Final(HELP_TEXT.to_string())),
            Command::Weather { location } => self.handler.current_report(city(&location))?,
            Command::Forecast { location, days } => {
                self.handler.forecast_report(city(&location), days)?
            }
            Command::Air {
                location,
                days: None,
            } => self.handler.air_quality_report(city(&location))?,
            Command::Air {
                location,
                days: Some(days),
            } => self
                .handler
                .air_quality_history_report(city(&location), days)?,
            Command::Recommend { location } => {
                self.handler.recommendation_report(city(&location))?
            }
            Command::Travel { location } => self.handler.travel_report(city(&location))?,
        };
        Ok(Reply::Draft(text))
    }
}

/// Known city named in the verb's arguments, or the default city
fn city(location: &str) -> &'static str {
    resolve_known_city(location).unwrap_or_else(|| {
        info!("No known city in '{}', using {}", location, DEFAULT_CITY);
        DEFAULT_CITY
    })
}

fn failure(error: &AssistantError) -> Reply {
    warn!("Command failed: {}", error);
    Reply::Final(format!(
        "Sorry, I couldn't complete that request: {}",
        error.user_message()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::fake::FakeWeather;
    use rstest::rstest;

    fn dispatcher() -> CommandDispatcher<FakeWeather> {
        CommandDispatcher::new(WeatherQueryHandler::new(FakeWeather::default()))
    }

    fn calls(dispatcher: &CommandDispatcher<FakeWeather>) -> Vec<String> {
        dispatcher.handler().provider().calls()
    }

    #[rstest]
    #[case("weather Lahore", Command::Weather { location: "Lahore".into() })]
    #[case("WEATHER new york", Command::Weather { location: "new york".into() })]
    #[case("forecast Karachi 5", Command::Forecast { location: "Karachi".into(), days: 5 })]
    #[case("forecast Karachi", Command::Forecast { location: "Karachi".into(), days: 3 })]
    #[case("forecast Dera Ghazi Khan 2", Command::Forecast { location: "Dera Ghazi Khan".into(), days: 2 })]
    #[case("forecast 2", Command::Forecast { location: "2".into(), days: 3 })]
    #[case("air Lahore", Command::Air { location: "Lahore".into(), days: None })]
    #[case("air Lahore 7", Command::Air { location: "Lahore".into(), days: Some(7) })]
    #[case("recommend Quetta", Command::Recommend { location: "Quetta".into() })]
    #[case("travel Multan", Command::Travel { location: "Multan".into() })]
    #[case("help", Command::Help)]
    fn test_parse_commands(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse_command(line).unwrap(), Parsed::Command(expected));
    }

    #[rstest]
    #[case("weather", WEATHER_USAGE)]
    #[case("forecast  ", FORECAST_USAGE)]
    #[case("air", AIR_USAGE)]
    #[case("recommend", RECOMMEND_USAGE)]
    #[case("travel", TRAVEL_USAGE)]
    fn test_missing_arguments_give_usage(#[case] line: &str, #[case] usage: &'static str) {
        assert_eq!(parse_command(line).unwrap(), Parsed::Usage(usage));
        assert_eq!(dispatcher().dispatch(line), Reply::Final(usage.to_string()));
    }

    #[rstest]
    #[case("forecast Karachi 0")]
    #[case("forecast Karachi 6")]
    #[case("forecast Karachi 99999999999")]
    #[case("air Lahore 31")]
    fn test_out_of_range_days_rejected(#[case] line: &str) {
        let err = parse_command(line).unwrap_err();
        assert!(matches!(err, AssistantError::Validation { .. }));
    }

    #[test]
    fn test_out_of_range_days_reply_is_final() {
        let dispatcher = dispatcher();
        let reply = dispatcher.dispatch("forecast Karachi 0");
        assert_eq!(
            reply,
            Reply::Final(
                "Sorry, I couldn't complete that request: Invalid input: days must be between 1 and 5"
                    .to_string()
            )
        );
        assert!(calls(&dispatcher).is_empty());
    }

    #[test]
    fn test_weather_verb_queries_named_city() {
        let dispatcher = dispatcher();
        let reply = dispatcher.dispatch("weather Lahore");
        assert_eq!(calls(&dispatcher), vec!["current:Lahore"]);
        match reply {
            Reply::Draft(text) => {
                assert!(text.contains("Lahore"));
                assert!(text.contains("31.4"));
            }
            Reply::Final(text) => panic!("expected a draft, got {text}"),
        }
    }

    #[test]
    fn test_forecast_verb_requests_days() {
        let dispatcher = dispatcher();
        let reply = dispatcher.dispatch("forecast Karachi 5");
        assert_eq!(calls(&dispatcher), vec!["forecast:Karachi:5"]);
        assert!(reply.text().starts_with("5-day forecast for Karachi:"));
    }

    #[test]
    fn test_air_with_days_reports_history() {
        let dispatcher = dispatcher();
        let reply = dispatcher.dispatch("air Lahore 2");
        assert!(reply.text().contains("2 of 2 days available"));
        assert_eq!(calls(&dispatcher)[0], "geocode:Lahore");
    }

    #[rstest]
    #[case("Weather in Lahore?", "current:Lahore")]
    #[case("weather for karachi today", "current:Karachi")]
    #[case("forecast for Karachi 3", "forecast:Karachi:3")]
    #[case("recommend something near Quetta", "current:Quetta")]
    #[case("travel to Multan", "current:Multan")]
    fn test_verb_arguments_go_through_city_extraction(#[case] line: &str, #[case] first_call: &str) {
        let dispatcher = dispatcher();
        let reply = dispatcher.dispatch(line);
        assert_eq!(calls(&dispatcher)[0], first_call);
        assert!(matches!(reply, Reply::Draft(_)));
    }

    #[rstest]
    #[case("weather London", "current:Islamabad")]
    #[case("forecast Dera Ghazi Khan 2", "forecast:Islamabad:2")]
    #[case("air somewhere", "air:Islamabad")]
    fn test_verb_without_known_city_uses_default(#[case] line: &str, #[case] call: &str) {
        let dispatcher = dispatcher();
        dispatcher.dispatch(line);
        assert_eq!(calls(&dispatcher), vec![call]);
    }

    #[test]
    fn test_failed_free_text_answer_is_final() {
        let dispatcher = CommandDispatcher::new(WeatherQueryHandler::new(FakeWeather {
            fail_current: true,
            ..FakeWeather::default()
        }));
        assert_eq!(
            dispatcher.answer("will it rain in Quetta"),
            Reply::Final(
                "Sorry, I encountered an error: API error: city not found. Please try rephrasing your question."
                    .to_string()
            )
        );
    }

    #[test]
    fn test_help_is_final() {
        assert_eq!(dispatcher().dispatch("Help"), Reply::Final(HELP_TEXT.to_string()));
    }

    #[test]
    fn test_unknown_verb_forwards_raw_line_once() {
        let dispatcher = dispatcher();
        let reply = dispatcher.dispatch("humidity Karachi please");
        assert_eq!(calls(&dispatcher), vec!["current:Karachi"]);
        assert!(matches!(reply, Reply::Draft(_)));
        assert!(reply.text().starts_with("Current weather in Karachi"));
    }

    #[test]
    fn test_upstream_error_is_converted() {
        let dispatcher = CommandDispatcher::new(WeatherQueryHandler::new(FakeWeather {
            fail_current: true,
            ..FakeWeather::default()
        }));
        assert_eq!(
            dispatcher.dispatch("travel Atlantis"),
            Reply::Final(
                "Sorry, I couldn't complete that request: Weather service error: city not found"
                    .to_string()
            )
        );
    }

    #[rstest]
    #[case("weather Lahore", true)]
    #[case("Forecast x", true)]
    #[case("what is the weather", false)]
    #[case("", false)]
    fn test_is_verb(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_verb(line), expected);
    }
}
