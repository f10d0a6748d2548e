//! # Error Handling
//!
//! This module provides the error types for Journly Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Vault Errors                                                      │
//! │  │   ├── VaultLocked           - Operation needs an unlocked vault     │
//! │  │   └── VaultNotInitialized   - No vault has been set up yet          │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── KeyDerivationFailed   - PBKDF2 derivation failed              │
//! │  │   ├── EncryptionFailed      - AES-GCM encryption failed             │
//! │  │   └── DecryptionFailed      - Wrong passphrase or corrupt data      │
//! │  │                                                                      │
//! │  ├── Domain Errors                                                     │
//! │  │   ├── EntryNotFound         - Referenced record id is absent        │
//! │  │   └── ValidationFailed      - Malformed input to a constructor      │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── DatabaseFailed        - SQLite operation failed               │
//! │  │   └── SerializationFailed   - Malformed JSON/base64 input           │
//! │  │                                                                      │
//! │  ├── Transport Errors                                                  │
//! │  │   ├── CredentialsRejected   - Bearer token refused (401/403)        │
//! │  │   ├── RateLimited           - Remote throttled the request (429)    │
//! │  │   └── NetworkFailed         - Connectivity or HTTP failure          │
//! │  │                                                                      │
//! │  └── AI Errors                                                         │
//! │      ├── AiNotReady            - Adapter used before initialization    │
//! │      └── AiRequestFailed       - Provider returned an unusable reply   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `DecryptionFailed` carries no detail on purpose: a wrong passphrase and
//! tampered ciphertext must be indistinguishable to the user, so neither
//! becomes an oracle about the other. Transport errors carry specific,
//! actionable messages instead; they never touch vault secrets.

use thiserror::Error;

/// Result type alias for Journly Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Journly Core
///
/// A closed set of variants so that every call site can handle each kind
/// exhaustively at compile time.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Vault Errors (100-199)
    // ========================================================================

    /// The vault is locked and the operation needs the session key
    #[error("Vault is locked. Unlock it with your passphrase first.")]
    VaultLocked,

    /// No vault exists yet (no salt persisted); run setup first
    #[error("No vault has been set up on this device yet.")]
    VaultNotInitialized,

    // ========================================================================
    // Crypto Errors (200-299)
    // ========================================================================

    /// Passphrase key derivation failed
    #[error("Failed to derive vault key: {0}")]
    KeyDerivationFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authenticated decryption failed: wrong key, wrong IV, or tampered
    /// ciphertext. Deliberately detail-free.
    #[error("Decryption failed: wrong passphrase or corrupt data")]
    DecryptionFailed,

    // ========================================================================
    // Domain Errors (300-399)
    // ========================================================================

    /// A referenced record does not exist
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    /// Input rejected by a domain constructor
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// Database error
    #[error("Database error: {0}")]
    DatabaseFailed(String),

    /// Malformed serialized data (invalid base64, JSON, or field shape)
    #[error("Serialization error: {0}")]
    SerializationFailed(String),

    // ========================================================================
    // Transport Errors (500-599)
    // ========================================================================

    /// The remote rejected our bearer credentials
    #[error("Credentials rejected: {0}")]
    CredentialsRejected(String),

    /// The remote throttled the request
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Connectivity problem or unexpected HTTP failure
    #[error("Network error: {0}")]
    NetworkFailed(String),

    // ========================================================================
    // AI Errors (600-699)
    // ========================================================================

    /// The AI adapter was used before it was initialized
    #[error("AI adapter ({0}) is not ready. Initialize it first.")]
    AiNotReady(String),

    /// The AI provider returned an unusable response
    #[error("AI request failed: {0}")]
    AiRequestFailed(String),
}

impl Error {
    /// Get the numeric code for this error
    ///
    /// Codes are organized by category:
    /// - 100-199: Vault lifecycle
    /// - 200-299: Crypto
    /// - 300-399: Domain
    /// - 400-499: Storage
    /// - 500-599: Transport
    /// - 600-699: AI
    pub fn code(&self) -> i32 {
        match self {
            // Vault (100-199)
            Error::VaultLocked => 100,
            Error::VaultNotInitialized => 101,

            // Crypto (200-299)
            Error::KeyDerivationFailed(_) => 200,
            Error::EncryptionFailed(_) => 201,
            Error::DecryptionFailed => 202,

            // Domain (300-399)
            Error::EntryNotFound(_) => 300,
            Error::ValidationFailed(_) => 301,

            // Storage (400-499)
            Error::DatabaseFailed(_) => 400,
            Error::SerializationFailed(_) => 401,

            // Transport (500-599)
            Error::CredentialsRejected(_) => 500,
            Error::RateLimited(_) => 501,
            Error::NetworkFailed(_) => 502,

            // AI (600-699)
            Error::AiNotReady(_) => 600,
            Error::AiRequestFailed(_) => 601,
        }
    }

    /// Check if this error is recoverable by retrying later
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::RateLimited(_) | Error::NetworkFailed(_) | Error::AiRequestFailed(_)
        )
    }

    /// Check if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Error::VaultLocked
                | Error::VaultNotInitialized
                | Error::DecryptionFailed
                | Error::ValidationFailed(_)
                | Error::CredentialsRejected(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DatabaseFailed(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationFailed(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::SerializationFailed(err.to_string())
        } else {
            Error::NetworkFailed(err.to_string())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::VaultLocked.code(), 100);
        assert_eq!(Error::KeyDerivationFailed("test".into()).code(), 200);
        assert_eq!(Error::DecryptionFailed.code(), 202);
        assert_eq!(Error::EntryNotFound("id".into()).code(), 300);
        assert_eq!(Error::DatabaseFailed("test".into()).code(), 400);
        assert_eq!(Error::CredentialsRejected("test".into()).code(), 500);
        assert_eq!(Error::AiNotReady("remote".into()).code(), 600);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::RateLimited("throttled".into()).is_recoverable());
        assert!(Error::NetworkFailed("offline".into()).is_recoverable());
        assert!(!Error::DecryptionFailed.is_recoverable());
        assert!(!Error::VaultLocked.is_recoverable());
    }

    #[test]
    fn test_user_action_errors() {
        assert!(Error::VaultLocked.requires_user_action());
        assert!(Error::DecryptionFailed.requires_user_action());
        assert!(!Error::RateLimited("throttled".into()).requires_user_action());
    }

    #[test]
    fn test_decryption_error_has_fixed_message() {
        // Wrong passphrase and corrupt data must read identically.
        assert_eq!(
            Error::DecryptionFailed.to_string(),
            "Decryption failed: wrong passphrase or corrupt data"
        );
    }
}
