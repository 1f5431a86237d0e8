//! Language-model access behind a single text-in/text-out call
//!
//! [`OpenAiCompleter`] talks to any OpenAI-compatible `chat/completions`
//! endpoint with one user message per call.

use crate::config::{LLM_KEY_VAR, LlmConfig};
use crate::error::truncate_body;
use crate::{AssistantError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// One synchronous completion
pub trait TextCompleter {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for an OpenAI-compatible chat completions API
pub struct OpenAiCompleter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiCompleter {
    /// Create a new completer; a missing key is only reported when called
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("skyroute/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn parse_response(body: &str) -> Result<String> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| AssistantError::llm(format!("Invalid completion response: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AssistantError::llm("Completion response contained no text"))
    }
}

impl TextCompleter for OpenAiCompleter {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AssistantError::config(format!("{LLM_KEY_VAR} is not set")))?;

        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let start_time = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!(
            "Completion response {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            return Err(map_http_error(status.as_u16(), &body));
        }

        let text = Self::parse_response(&body)?;
        info!("Completion returned {} characters", text.len());
        Ok(text)
    }
}

fn map_http_error(status: u16, body: &str) -> AssistantError {
    let safe_body = truncate_body(body);

    match status {
        401 => AssistantError::llm(format!("Unauthorized: check {LLM_KEY_VAR}")),
        429 => AssistantError::llm("Rate limited by the language model API"),
        s if s >= 500 => AssistantError::llm(format!("Server error {s}: {safe_body}")),
        s => AssistantError::llm(format!("HTTP {s}: {safe_body}")),
    }
}
