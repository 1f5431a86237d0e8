//! Configuration management for the skyroute assistant
//!
//! Settings are layered: an optional TOML file, `SKYROUTE_`-prefixed
//! environment variables, and finally the well-known credential variables
//! (`OPENWEATHERMAP_API_KEY`, `OPENAI_API_KEY`, `TAVILY_API_KEY`) for any key
//! that is still unset.

use crate::{AssistantError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the weather provider key
pub const WEATHER_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";
/// Environment variable holding the language-model key
pub const LLM_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the web search key
pub const SEARCH_KEY_VAR: &str = "TAVILY_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Weather provider settings
    pub weather: WeatherConfig,
    /// Language-model settings
    pub llm: LlmConfig,
    /// Web search settings
    pub search: SearchConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Weather provider (OpenWeatherMap) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API key, required at startup
    pub api_key: Option<String>,
    /// Provider host; `data/2.5/*` and `geo/1.0/*` paths are appended
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Country code appended to geocoding candidates
    pub country_code: String,
    /// Country name appended to geocoding candidates
    pub country_name: String,
}

/// Language-model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; absence surfaces on the first model call
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Web search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// API key; absence surfaces on the first search
    pub api_key: Option<String>,
    /// Base URL of the search API
    pub base_url: String,
    /// Number of results requested per search
    pub max_results: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

fn default_timeout() -> u32 {
    30
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org".to_string(),
            timeout_seconds: default_timeout(),
            country_code: "PK".to_string(),
            country_name: "Pakistan".to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            max_results: 5,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AssistantConfig {
    /// Load configuration from the default file location and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the given file (if it exists) and the environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("skyroute.toml"))
        });

        let mut config = Self::from_sources(&config_file)?;
        config.apply_credentials(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Build from the TOML file and `SKYROUTE_` variables without validating
    pub fn from_sources(config_file: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.to_path_buf())
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("SKYROUTE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AssistantError::config(format!("Failed to build configuration: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| AssistantError::config(format!("Failed to deserialize configuration: {e}")))
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skyroute").join("config.toml"))
    }

    /// Fill unset keys from the well-known credential variables
    pub fn apply_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.weather.api_key.is_none() {
            self.weather.api_key = lookup(WEATHER_KEY_VAR);
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup(LLM_KEY_VAR);
        }
        if self.search.api_key.is_none() {
            self.search.api_key = lookup(SEARCH_KEY_VAR);
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The weather key is the only credential required at startup
    pub fn validate_api_keys(&self) -> Result<()> {
        match self.weather.api_key.as_deref().map(str::trim) {
            None => Err(AssistantError::config(format!(
                "{WEATHER_KEY_VAR} environment variable is not set"
            ))),
            Some("") => Err(AssistantError::config(format!("{WEATHER_KEY_VAR} is empty"))),
            Some(_) => Ok(()),
        }
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("weather", self.weather.timeout_seconds),
            ("llm", self.llm.timeout_seconds),
            ("search", self.search.timeout_seconds),
        ] {
            if timeout == 0 || timeout > 300 {
                return Err(AssistantError::config(format!(
                    "{name} timeout must be between 1 and 300 seconds"
                )));
            }
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AssistantError::config(
                "LLM temperature must be between 0.0 and 2.0",
            ));
        }

        if self.search.max_results == 0 || self.search.max_results > 20 {
            return Err(AssistantError::config(
                "Search max_results must be between 1 and 20",
            ));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AssistantError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AssistantError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        for (name, url) in [
            ("weather", &self.weather.base_url),
            ("llm", &self.llm.base_url),
            ("search", &self.search.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AssistantError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        Ok(())
    }
}
