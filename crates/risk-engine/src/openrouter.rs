//! OpenRouter chat-completions scorer

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared_types::ClauseAssessment;
use tracing::{debug, warn};

use crate::prompt::{build_prompt, parse_assessment};
use crate::scorer::{ClauseScorer, ScoreError};
use crate::EngineError;

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_OPENROUTER_MODEL: &str = "deepseek/deepseek-r1-0528-qwen3-8b:free";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest error body kept in a [`ScoreError::Status`]
const MAX_ERROR_BODY: usize = 500;

#[derive(Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
}

impl OpenRouterConfig {
    /// Config with default endpoint, model and timeout.
    ///
    /// # Errors
    /// `EngineError::Config` when the key is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, EngineError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(EngineError::Config(
                "OpenRouter API key is not configured".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            url: DEFAULT_OPENROUTER_URL.to_string(),
            model: DEFAULT_OPENROUTER_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_LLM_TIMEOUT,
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// The key never reaches logs
impl fmt::Debug for OpenRouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterConfig")
            .field("api_key", &"<redacted>")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
    /// OpenRouter reports some upstream failures in a 200 body
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Scores clauses through an OpenRouter-compatible chat completions endpoint.
///
/// One `reqwest::Client` is shared by every request so connections are pooled.
pub struct OpenRouterScorer {
    client: Client,
    config: OpenRouterConfig,
}

impl OpenRouterScorer {
    pub fn new(config: OpenRouterConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EngineError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: OpenRouterConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }
}

#[async_trait]
impl ClauseScorer for OpenRouterScorer {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn score_clause(&self, clause: &str) -> Result<ClauseAssessment, ScoreError> {
        let prompt = build_prompt(clause);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.config.temperature,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScoreError::Transport(describe_transport_error(&e)))?;

        let status = response.status();
        debug!(
            "OpenRouter answered {} in {}ms",
            status,
            started.elapsed().as_millis()
        );

        let body = response
            .bytes()
            .await
            .map_err(|e| ScoreError::Transport(describe_transport_error(&e)))?;

        if !status.is_success() {
            let body = truncate(&String::from_utf8_lossy(&body), MAX_ERROR_BODY);
            warn!("OpenRouter request failed with status {}", status);
            return Err(ScoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChatResponse = serde_json::from_slice(&body)
            .map_err(|e| ScoreError::Parse(format!("invalid completion body: {}", e)))?;

        if let Some(error) = payload.error {
            return Err(ScoreError::Status {
                status: error.code.unwrap_or(502),
                body: truncate(&error.message, MAX_ERROR_BODY),
            });
        }

        if let Some(usage) = &payload.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "OpenRouter usage"
            );
        }

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ScoreError::Parse("completion has no message content".to_string()))?;

        parse_assessment(&content, clause)
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
