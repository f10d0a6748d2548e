//! # Remote AI Adapter
//!
//! OpenAI-compatible chat-completions client. Works against any endpoint
//! speaking the `/v1/chat/completions` shape. Failure messages distinguish
//! bad credentials, rate limiting, and connectivity so the user can act on
//! them; none of these paths involve vault data.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::preferences::AiConfig;

use super::{AiAdapter, GenerateRequest, GenerateResponse, ProviderKind};
use super::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

const DEFAULT_REMOTE_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Default)]
struct RemoteConfig {
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u32,
}

/// OpenAI-compatible remote provider
pub struct RemoteAiAdapter {
    client: reqwest::Client,
    config: RwLock<RemoteConfig>,
}

impl RemoteAiAdapter {
    /// Create an unconfigured adapter; call `initialize` before `generate`
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            config: RwLock::new(RemoteConfig::default()),
        }
    }
}

impl Default for RemoteAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiAdapter for RemoteAiAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Remote
    }

    async fn is_ready(&self) -> bool {
        let config = self.config.read();
        !config.endpoint.is_empty() && !config.api_key.is_empty()
    }

    async fn initialize(&self, config: &AiConfig, api_key: Option<&str>) -> Result<()> {
        let endpoint = config
            .remote_endpoint
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        let model = config
            .remote_model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_REMOTE_MODEL.to_string());

        *self.config.write() = RemoteConfig {
            endpoint,
            api_key: api_key.unwrap_or_default().to_string(),
            model,
        };

        Ok(())
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let config = self.config.read().clone();
        if config.endpoint.is_empty() || config.api_key.is_empty() {
            return Err(Error::AiNotReady(self.provider().as_str().into()));
        }

        let body = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", config.endpoint))
            .bearer_auth(&config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|_| {
                Error::NetworkFailed(
                    "could not reach the AI endpoint; check the URL and your connection".into(),
                )
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                return Err(Error::CredentialsRejected(
                    "invalid API key; check your AI credentials".into(),
                ))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(Error::RateLimited(
                    "AI provider is throttling requests; wait a moment and try again".into(),
                ))
            }
            status => {
                let detail = response.text().await.unwrap_or_default();
                return Err(Error::AiRequestFailed(format!(
                    "provider returned status {}: {}",
                    status, detail
                )));
            }
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(Error::AiRequestFailed(
                "provider returned an empty response".into(),
            ));
        }

        Ok(GenerateResponse {
            content,
            tokens_used: parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
            provider: ProviderKind::Remote,
            model: config.model,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
