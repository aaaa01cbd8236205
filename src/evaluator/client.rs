//! Ollama chat client.
//!
//! Sends one non-streaming chat request per resume. Transport errors,
//! rate limiting and server errors are retried with exponential backoff;
//! any other HTTP error fails immediately.

use crate::config::ModelConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to Ollama at {0}. Is Ollama running?")]
    Connect(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ollama API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Giving up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Timeout(_) | LlmError::Connect(_) | LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::EmptyContent | LlmError::Exhausted { .. } => false,
        }
    }
}

/// Something that turns a system + user prompt into a reply.
pub trait ChatModel {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Chat client for a local Ollama server.
pub struct OllamaClient {
    config: ModelConfig,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: ModelConfig) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// One request, no retries.
    async fn send_once(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));

        let request = OllamaChatRequest {
            model: &self.config.name,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    LlmError::Connect(self.config.ollama_url.clone())
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat_response: OllamaChatResponse = response.json().await?;
        let content = chat_response.message.content;
        if content.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        Ok(content)
    }
}

impl ChatModel for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        with_retries(self.config.retries, Duration::from_secs(1), || {
            self.send_once(system, prompt)
        })
        .await
    }
}

/// Run `call` up to `attempts` times, backing off 1x, 2x, 4x ... `base_delay`.
pub async fn with_retries<F, Fut>(
    attempts: u32,
    base_delay: Duration,
    mut call: F,
) -> Result<String, LlmError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<String, LlmError>>,
{
    let attempts = attempts.max(1);
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            let delay = base_delay * (1 << (attempt - 1).min(16));
            warn!(
                "Model call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        match call().await {
            Ok(content) => {
                debug!("Model call succeeded on attempt {}", attempt + 1);
                return Ok(content);
            }
            Err(e) if e.is_transient() => last_error = Some(e),
            Err(e) => return Err(e),
        }
    }

    Err(match last_error {
        Some(last) => LlmError::Exhausted {
            attempts,
            last: Box::new(last),
        },
        None => LlmError::EmptyContent,
    })
}

/// Strip a surrounding ```markdown / ``` code fence from a reply.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the info string (e.g. "markdown") on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_strip_code_fences_with_tag() {
        let input = "```markdown\n# Jane Doe - Engineer\n```";
        assert_eq!(strip_code_fences(input), "# Jane Doe - Engineer");
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        let input = "```\n# Jane Doe - Engineer\n```\n";
        assert_eq!(strip_code_fences(input), "# Jane Doe - Engineer");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        assert_eq!(strip_code_fences("  # Jane\n"), "# Jane");
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Api { status: 429, message: String::new() }.is_transient());
        assert!(LlmError::Api { status: 503, message: String::new() }.is_transient());
        assert!(!LlmError::Api { status: 400, message: String::new() }.is_transient());
        assert!(LlmError::Timeout(30).is_transient());
        assert!(!LlmError::EmptyContent.is_transient());
    }

    #[test]
    fn test_retries_until_success() {
        let calls = Cell::new(0);
        let result = tokio_test::block_on(with_retries(3, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(LlmError::Api { status: 503, message: "busy".to_string() })
                } else {
                    Ok("done".to_string())
                }
            }
        }));

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retries_are_bounded() {
        let calls = Cell::new(0);
        let result = tokio_test::block_on(with_retries(2, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            async { Err(LlmError::Timeout(1)) }
        }));

        assert!(matches!(result, Err(LlmError::Exhausted { attempts: 2, .. })));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_permanent_error_is_not_retried() {
        let calls = Cell::new(0);
        let result = tokio_test::block_on(with_retries(5, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            async { Err(LlmError::Api { status: 404, message: "model not found".to_string() }) }
        }));

        assert!(matches!(result, Err(LlmError::Api { status: 404, .. })));
        assert_eq!(calls.get(), 1);
    }
}
