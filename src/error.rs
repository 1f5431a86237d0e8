//! Error types and handling for the skyroute assistant

use thiserror::Error;

/// Main error type for the assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Configuration-related errors (missing credentials, bad values)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Non-success or undecodable responses from the weather provider
    #[error("API error: {message}")]
    Api { message: String },

    /// Geocoding exhausted every candidate name
    #[error(
        "Could not find coordinates for {location}. Please check the location name and try again."
    )]
    LocationNotFound { location: String },

    /// Language-model call failures
    #[error("Language model error: {message}")]
    Llm { message: String },

    /// Web search failures
    #[error("Search error: {message}")]
    Search { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Transport-level HTTP errors
    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Maximum number of characters from an HTTP error body kept in error messages
const MAX_ERROR_BODY_LEN: usize = 200;

/// Shorten an upstream error body for inclusion in an error message
#[must_use]
pub fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LEN {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{truncated}…[truncated]")
    } else {
        body.to_string()
    }
}

impl AssistantError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(location: S) -> Self {
        Self::LocationNotFound {
            location: location.into(),
        }
    }

    /// Create a new language-model error
    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    /// Create a new search error
    pub fn search<S: Into<String>>(message: S) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AssistantError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            AssistantError::Api { message } => format!("Weather service error: {message}"),
            AssistantError::LocationNotFound { .. } => self.to_string(),
            AssistantError::Llm { .. } => {
                "The language model is unavailable right now.".to_string()
            }
            AssistantError::Search { message } => format!("Web search failed: {message}"),
            AssistantError::Validation { message } => format!("Invalid input: {message}"),
            AssistantError::Http { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            AssistantError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
