//! Tool selection: weather data or general web search
//!
//! A set-membership test over a fixed keyword list. The first matching
//! keyword is irrelevant; any match selects the weather tool.

use std::fmt;

/// Keywords that send a query to the weather tool
pub const WEATHER_KEYWORDS: [&str; 6] = [
    "weather",
    "temperature",
    "forecast",
    "rain",
    "snow",
    "humidity",
];

/// Destination for a free-text query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Weather,
    Search,
}

impl Tool {
    /// Tool name as shown in logs
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tool::Weather => "weather_agent",
            Tool::Search => "web_search",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the tool for a free-text query
#[must_use]
pub fn select_tool(query: &str) -> Tool {
    let query = query.to_lowercase();
    if WEATHER_KEYWORDS.iter().any(|keyword| query.contains(keyword)) {
        Tool::Weather
    } else {
        Tool::Search
    }
}
