//! LLM Client: the single point of entry for chat-completion calls.
//!
//! No other module talks to the DeepSeek API directly; everything goes
//! through a `ChatClient`, which the orchestrators receive at construction.
//!
//! One request, one response: no retries, no streaming. Deadlines are the
//! caller's job (dropping the future aborts the in-flight request).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode chat response (status {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub stream: bool,
}

/// Every field defaults so that error bodies still decode; such a response
/// simply carries no choices.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl ChatResponse {
    /// Content of the first choice, if the service produced one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub prompt_cache_hit_tokens: u32,
}

/// Request/response adapter to a remote chat-completion service.
/// Carried in `AppState` as `Arc<dyn ChatClient>`.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// DeepSeek chat-completions over HTTPS with a bearer key.
#[derive(Clone)]
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl DeepSeekClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ChatClient for DeepSeekClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            // Still decoded below; an error body yields a response without choices.
            warn!(
                "Chat API returned {}: {}",
                status,
                String::from_utf8_lossy(&body)
            );
        }

        let chat_response: ChatResponse =
            serde_json::from_slice(&body).map_err(|source| LlmError::Parse {
                status: status.as_u16(),
                source,
            })?;

        debug!(
            "Chat call {} finished: model={}, choices={}, finish_reason={:?}, prompt_tokens={} ({} cached), completion_tokens={}, total_tokens={}",
            chat_response.id,
            chat_response.model,
            chat_response.choices.len(),
            chat_response
                .choices
                .first()
                .and_then(|c| c.finish_reason.as_deref()),
            chat_response.usage.prompt_tokens,
            chat_response.usage.prompt_cache_hit_tokens,
            chat_response.usage.completion_tokens,
            chat_response.usage.total_tokens
        );

        Ok(chat_response)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
