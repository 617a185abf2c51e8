//! OpenAI-compatible chat-completions provider
//!
//! Each translation is one `POST` to the configured endpoint carrying the
//! prompt template as the system message and the source string as the user
//! message. Any endpoint that speaks the chat-completions wire format works.
//!
//! # Example
//!
//! ```ignore
//! use lingotree_mt::{ChatCompletionProvider, MachineTranslator, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranslationConfig::default().with_env_overrides();
//!     let provider = ChatCompletionProvider::from_config(&config)?;
//!
//!     let result = provider.translate("Hello, world!").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::TranslationConfig;
use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;

/// Token ceiling sent with every request
pub const MAX_TOKENS: u32 = 1000;

/// Sampling temperature sent with every request
pub const TEMPERATURE: f64 = 0.3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// First choice's content, trimmed, if it is non-empty
    fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
    }
}

/// Chat-completions API provider
#[derive(Clone)]
pub struct ChatCompletionProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    prompt_template: String,
}

impl ChatCompletionProvider {
    /// Create a provider from validated settings
    ///
    /// # Errors
    ///
    /// * `MtError::Config` - endpoint, key or model is empty
    /// * `MtError::Network` - the HTTP client could not be built
    pub fn from_config(config: &TranslationConfig) -> MtResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MtError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            prompt_template: config.prompt_template.clone(),
        })
    }

    fn request_body<'a>(&'a self, text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.prompt_template,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

impl std::fmt::Debug for ChatCompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for ChatCompletionProvider {
    async fn translate(&self, text: &str) -> MtResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MtError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| MtError::Network(format!("Failed to read completion: {}", e)))?;

        match parsed.first_content() {
            Some(content) => Ok(content.to_string()),
            None => {
                debug!("Completion had no usable content, keeping source text");
                Ok(text.to_string())
            }
        }
    }

    fn provider_name(&self) -> &str {
        "Chat Completions"
    }
}
