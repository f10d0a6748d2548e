//! # AI Adapter Contract
//!
//! Abstracts story-generation providers behind one request/response
//! contract. The application layer composes entries into a prompt and asks
//! an adapter for a narrative; it never knows which provider is active.
//!
//! Only the contract and the remote (OpenAI-compatible) adapter live in
//! this crate. On-device model loading, prompt packs, and text
//! preprocessing are presentation-layer concerns outside the vault core.

mod remote;

pub use remote::RemoteAiAdapter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preferences::AiConfig;

/// Default token budget for a generation request
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Which kind of provider produced a response (and, on a story, which
/// produced the story)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// On-device model
    Local,
    /// OpenAI-compatible remote endpoint
    Remote,
}

impl ProviderKind {
    /// Human-readable name, used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Remote => "remote",
        }
    }
}

/// A generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// System-level instructions
    pub system_prompt: String,
    /// User-level prompt (includes journal content)
    pub user_prompt: String,
    /// Token budget; adapter default when `None`
    pub max_tokens: Option<u32>,
    /// Sampling temperature; adapter default when `None`
    pub temperature: Option<f32>,
}

/// A generation response
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    /// The generated text
    pub content: String,
    /// Approximate tokens consumed
    pub tokens_used: u32,
    /// Which provider produced this response
    pub provider: ProviderKind,
    /// Model identifier used
    pub model: String,
}

/// A story-generation provider
///
/// Adapters receive the plaintext API key at initialization from the
/// session's in-memory copy; they never read credentials from storage.
#[async_trait]
pub trait AiAdapter: Send + Sync {
    /// Which provider this adapter represents
    fn provider(&self) -> ProviderKind;

    /// Whether the adapter is initialized and able to serve requests
    async fn is_ready(&self) -> bool;

    /// Configure the adapter
    async fn initialize(&self, config: &AiConfig, api_key: Option<&str>) -> Result<()>;

    /// Generate a completion
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;
}
