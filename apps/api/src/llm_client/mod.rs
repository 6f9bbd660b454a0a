/// LLM client: the single point of entry for all Groq API calls in Hireflow.
///
/// ARCHITECTURAL RULE: No other module may call the Groq API directly.
/// Analysis, cover letters, coaching and outreach drafting all go through here.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::LlmCache;

pub mod prompts;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
const TEMPERATURE: f32 = 0.4;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Tagged parse result
// ────────────────────────────────────────────────────────────────────────────

/// What came back from the model once transport succeeded.
///
/// Transport and API failures are `LlmError`; a reply that arrived but could
/// not be used is one of the non-`Parsed` variants.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmOutcome<T> {
    Parsed(T),
    /// The model replied, but the text did not match the expected schema.
    Malformed(String),
    Empty,
}

impl<T: DeserializeOwned> LlmOutcome<T> {
    /// Classifies raw model output. Code fences are stripped before parsing.
    pub fn from_text(text: Option<&str>) -> Self {
        let Some(raw) = text else {
            return LlmOutcome::Empty;
        };
        let stripped = strip_json_fences(raw);
        if stripped.is_empty() {
            return LlmOutcome::Empty;
        }
        match serde_json::from_str::<T>(stripped) {
            Ok(value) => LlmOutcome::Parsed(value),
            Err(e) => {
                debug!("LLM output failed to parse: {e}");
                LlmOutcome::Malformed(raw.to_string())
            }
        }
    }
}

impl<T> LlmOutcome<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, LlmOutcome::Parsed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LlmOutcome<U> {
        match self {
            LlmOutcome::Parsed(value) => LlmOutcome::Parsed(f(value)),
            LlmOutcome::Malformed(raw) => LlmOutcome::Malformed(raw),
            LlmOutcome::Empty => LlmOutcome::Empty,
        }
    }

    /// Returns the parsed value, or the supplied fallback for `Malformed` / `Empty`.
    pub fn or_fallback(self, what: &str, fallback: impl FnOnce() -> T) -> T {
        match self {
            LlmOutcome::Parsed(value) => value,
            LlmOutcome::Malformed(raw) => {
                let preview: String = raw.chars().take(200).collect();
                warn!("Malformed LLM output for {what}, using fallback. Output began: {preview}");
                fallback()
            }
            LlmOutcome::Empty => {
                warn!("Empty LLM output for {what}, using fallback");
                fallback()
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI-compatible chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl LlmResponse {
    /// Text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GroqError {
    error: GroqErrorBody,
}

#[derive(Debug, Deserialize)]
struct GroqErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the Groq chat completions API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(GROQ_API_URL)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GroqError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            if let Some(usage) = &llm_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the LLM and classifies the reply into an `LlmOutcome`.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_outcome<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<LlmOutcome<T>, LlmError> {
        let response = self.call(prompt, system).await?;
        Ok(LlmOutcome::from_text(response.text()))
    }

    /// Like `call_outcome`, but consults the response cache first and stores
    /// successfully parsed replies under `kind`.
    pub async fn call_cached<T: DeserializeOwned>(
        &self,
        cache: &LlmCache,
        kind: &str,
        prompt: &str,
        system: &str,
    ) -> Result<LlmOutcome<T>, LlmError> {
        let key = LlmCache::key(kind, &self.model, system, prompt);

        if let Some(hit) = cache.get(&key).await {
            if let LlmOutcome::Parsed(value) = LlmOutcome::<T>::from_text(Some(&hit)) {
                debug!("LLM cache hit for {kind}");
                return Ok(LlmOutcome::Parsed(value));
            }
        }

        let response = self.call(prompt, system).await?;
        let outcome = LlmOutcome::from_text(response.text());
        if outcome.is_parsed() {
            if let Some(text) = response.text() {
                cache.put(&key, strip_json_fences(text)).await;
            }
        }
        Ok(outcome)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim()),
        None => text,
    }
}
