//! # User Preferences
//!
//! The persisted configuration blob: theme, font size, encryption
//! parameters, and AI provider settings. Persisted as a single plaintext
//! JSON document through [`PreferenceStore`](crate::storage::PreferenceStore).
//!
//! The key-derivation salt and the sentinel ciphertext live here in
//! plaintext; neither is secret. The derived vault key is never part of
//! this structure. The remote AI API key is only ever persisted as
//! ciphertext: [`AiConfig`] has no serializable plaintext key field, so the
//! invariant holds by construction. (A legacy plaintext field is accepted
//! on read for one-time migration, but can never be written back.)

use serde::{Deserialize, Serialize};

use crate::crypto::PBKDF2_ITERATIONS;

/// Color theme selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    Light,
    /// Dark theme
    Dark,
    /// Follow the system setting
    #[default]
    System,
}

/// Font size selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    /// Small text
    Small,
    /// Default text
    #[default]
    Medium,
    /// Large text
    Large,
}

/// Key-derivation function selector (closed set; PBKDF2 only today)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyDerivationFn {
    /// PBKDF2-HMAC-SHA256
    #[default]
    #[serde(rename = "PBKDF2")]
    Pbkdf2,
}

/// Which AI provider is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// AI features disabled
    #[default]
    None,
    /// On-device model
    Local,
    /// OpenAI-compatible remote endpoint
    Remote,
}

/// Vault encryption parameters
///
/// Everything here is plaintext on purpose: the salt and iteration count
/// are public KDF inputs, and the sentinel ciphertext is only useful to
/// someone who already knows the passphrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionConfig {
    /// Whether the vault has been enabled on this device
    pub enabled: bool,
    /// Which KDF derives the vault key
    pub key_derivation: KeyDerivationFn,
    /// PBKDF2 iteration count
    pub iterations: u32,
    /// Key-derivation salt, base64 (absent until setup)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_base64: Option<String>,
    /// Sentinel ciphertext for passphrase verification, base64
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_ciphertext_base64: Option<String>,
    /// IV paired with the sentinel ciphertext, base64
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_iv_base64: Option<String>,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_derivation: KeyDerivationFn::Pbkdf2,
            iterations: PBKDF2_ITERATIONS,
            salt_base64: None,
            test_ciphertext_base64: None,
            test_iv_base64: None,
        }
    }
}

/// AI provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    /// Active provider
    pub provider: AiProvider,
    /// Remote endpoint base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_endpoint: Option<String>,
    /// AES-GCM ciphertext of the API key, base64 (the only persisted form)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_api_key_ciphertext: Option<String>,
    /// IV paired with `remote_api_key_ciphertext`, base64
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_api_key_iv: Option<String>,
    /// Remote model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_model: Option<String>,
    /// Plaintext key written by old versions. Read-only: accepted during
    /// deserialization so unlock can migrate it, never serialized again.
    #[serde(rename = "remoteApiKey", default, skip_serializing)]
    pub legacy_remote_api_key: Option<String>,
}

/// The persisted preferences document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Color theme
    pub theme: Theme,
    /// Font size
    pub font_size: FontSize,
    /// Vault encryption parameters
    pub encryption: EncryptionConfig,
    /// AI provider configuration
    pub ai: AiConfig,
}

// ============================================================================
// TESTS
// ============================================================================
