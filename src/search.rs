//! General web search for non-weather queries

use crate::config::{SEARCH_KEY_VAR, SearchConfig};
use crate::error::truncate_body;
use crate::{AssistantError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// One hit returned by the search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.url)?;
        if !self.content.is_empty() {
            write!(f, "\n  {}", self.content)?;
        }
        Ok(())
    }
}

/// Web search operations
pub trait SearchProvider {
    fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Client for the Tavily search API
pub struct TavilySearch {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    max_results: u32,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

impl TavilySearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("skyroute/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
        })
    }
}

impl SearchProvider for TavilySearch {
    #[instrument(skip(self))]
    fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AssistantError::config(format!("{SEARCH_KEY_VAR} is not set")))?;

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest {
                api_key,
                query,
                max_results: self.max_results,
            })
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            warn!("Search request failed with {}", status);
            return Err(status_error(status.as_u16(), &body));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| AssistantError::search(format!("invalid search response: {e}")))?;

        info!("Search returned {} results", parsed.results.len());
        Ok(parsed.results)
    }
}

fn status_error(status: u16, body: &str) -> AssistantError {
    AssistantError::search(format!(
        "search request failed with status {status}: {}",
        truncate_body(body)
    ))
}

/// Plain listing used when no model is available to summarise results
#[must_use]
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No search results found.".to_string();
    }

    let mut text = String::from("Here is what I found:");
    for (index, result) in results.iter().enumerate() {
        text.push_str(&format!("\n{}. {}", index + 1, result));
    }
    text
}
