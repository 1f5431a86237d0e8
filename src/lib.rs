//! `skyroute` - a command-line weather and web search assistant
//!
//! Weather questions and command verbs are answered from OpenWeatherMap data
//! and polished by a language model. Everything else goes to web search.

pub mod assistant;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extraction;
pub mod handler;
pub mod llm;
pub mod logging;
pub mod models;
pub mod recommendations;
pub mod reviewer;
pub mod router;
pub mod search;
pub mod weather;

// Re-export core types for public API
pub use assistant::{Assistant, Transcript, TurnOutcome};
pub use config::AssistantConfig;
pub use dispatcher::{CommandDispatcher, Reply};
pub use error::AssistantError;
pub use handler::WeatherQueryHandler;
pub use llm::{OpenAiCompleter, TextCompleter};
pub use models::{AirQualityReading, Coordinates, WeatherSnapshot};
pub use recommendations::{Recommendations, TravelImpact};
pub use reviewer::ResponseReviewer;
pub use router::{Tool, select_tool};
pub use search::{SearchProvider, SearchResult, TavilySearch};
pub use weather::{OpenWeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
