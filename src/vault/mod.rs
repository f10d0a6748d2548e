//! # Vault Session
//!
//! Owns the unlocked vault key and manages lock/unlock transitions.
//!
//! ## Session Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VAULT SESSION LIFECYCLE                          │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │                ┌──────────┐                                             │
//! │     load ────► │  Locked  │ ◄──────────────────────────┐                │
//! │                └────┬─────┘                            │                │
//! │                     │                                  │                │
//! │      first launch?  │  salt persisted?                 │ lock()         │
//! │      setup(pass)    │  unlock(pass)                    │ (explicit or   │
//! │                     ▼                                  │  auto-lock)    │
//! │                ┌──────────┐                            │                │
//! │                │ Unlocked │ ───────────────────────────┘                │
//! │                │ (key in  │                                             │
//! │                │  memory) │                                             │
//! │                └──────────┘                                             │
//! │                                                                         │
//! │  setup:  generate salt → derive key → encrypt sentinel → persist        │
//! │          {salt, iterations, sentinel} in plaintext preferences          │
//! │  unlock: verify passphrase against sentinel → derive key → best-effort  │
//! │          AI key recovery and legacy plaintext key migration             │
//! │  lock:   drop the key and every in-memory plaintext secret              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A wrong passphrase and a corrupted sentinel both come back as a plain
//! `false` from [`VaultSession::unlock`]: the caller shows one generic
//! message and learns nothing about which case occurred.
//!
//! The session is an explicit object owned by the application root and
//! shared by `Arc`; nothing in this crate reads it through global state.

mod autolock;

pub use autolock::{AutoLock, DEFAULT_AUTOLOCK_TIMEOUT};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::sync::Arc;

use crate::crypto::{decrypt, derive_key, encrypt, generate_salt, verify_passphrase, VaultKey};
use crate::error::{Error, Result};
use crate::preferences::{AiConfig, AiProvider, FontSize, Theme, UserPreferences};
use crate::storage::PreferenceStore;

/// Known plaintext encrypted under the vault key at setup time. Decrypting
/// it successfully proves a candidate passphrase without touching real data.
const SENTINEL: &str = "journly-vault-sentinel-v1";

/// Minimum accepted passphrase length in characters
pub const MIN_PASSPHRASE_LENGTH: usize = 8;

struct SessionState {
    key: Option<VaultKey>,
    preferences: UserPreferences,
    /// Plaintext AI API key, recovered on unlock. In-memory only.
    ai_api_key: Option<String>,
}

/// The vault session
///
/// Holds the derived key in process memory while unlocked. The key is
/// written exactly once per unlock and cleared exactly once per lock; it is
/// never persisted and never leaves this structure except through the
/// crate-internal read guard the repositories use.
pub struct VaultSession {
    store: Arc<dyn PreferenceStore>,
    state: RwLock<SessionState>,
}

impl VaultSession {
    /// Load the session from persisted preferences (Locked state)
    pub async fn load(store: Arc<dyn PreferenceStore>) -> Result<Self> {
        let preferences = store.load().await?.unwrap_or_default();

        Ok(Self {
            store,
            state: RwLock::new(SessionState {
                key: None,
                preferences,
                ai_api_key: None,
            }),
        })
    }

    /// Whether the vault key is currently in memory
    pub fn is_unlocked(&self) -> bool {
        self.state.read().key.is_some()
    }

    /// Whether no vault exists yet on this device (no salt persisted)
    pub fn is_first_launch(&self) -> bool {
        self.state.read().preferences.encryption.salt_base64.is_none()
    }

    /// A snapshot of the current preferences
    pub fn preferences(&self) -> UserPreferences {
        self.state.read().preferences.clone()
    }

    /// The in-memory plaintext AI API key, if one was recovered on unlock
    pub fn ai_api_key(&self) -> Option<String> {
        self.state.read().ai_api_key.clone()
    }

    /// Create the vault on first launch and transition to Unlocked
    ///
    /// Generates a fresh salt, derives the key, encrypts the sentinel, and
    /// persists `{enabled, iterations, salt, sentinel}` in plaintext
    /// preferences. Fails if a vault already exists.
    pub async fn setup(&self, passphrase: &str) -> Result<()> {
        if passphrase.chars().count() < MIN_PASSPHRASE_LENGTH {
            return Err(Error::ValidationFailed(format!(
                "passphrase must be at least {} characters",
                MIN_PASSPHRASE_LENGTH
            )));
        }
        if !self.is_first_launch() {
            return Err(Error::ValidationFailed(
                "a vault already exists on this device".into(),
            ));
        }

        let iterations = self.state.read().preferences.encryption.iterations;
        let salt = generate_salt();
        let key = derive_key(passphrase, &salt, iterations).await?;
        let sentinel = encrypt(&SENTINEL.to_string(), &key)?;

        let mut updated = self.preferences();
        updated.encryption.enabled = true;
        updated.encryption.salt_base64 = Some(BASE64.encode(salt));
        updated.encryption.test_ciphertext_base64 = Some(sentinel.ciphertext_base64);
        updated.encryption.test_iv_base64 = Some(sentinel.iv_base64);

        // Persist before committing to memory, so a failed save leaves the
        // device cleanly un-set-up instead of unlocked-but-unrepeatable.
        self.store.save(&updated).await?;

        let mut state = self.state.write();
        state.preferences = updated;
        state.key = Some(key);
        tracing::info!("vault created and unlocked");

        Ok(())
    }

    /// Unlock an existing vault
    ///
    /// Returns `Ok(false)` for a wrong passphrase (and for a sentinel that
    /// no longer authenticates); the session stays Locked. On success the
    /// key is held in memory and the stored AI API key, if any, is
    /// opportunistically recovered.
    pub async fn unlock(&self, passphrase: &str) -> Result<bool> {
        let (salt_base64, iterations, sentinel_ciphertext, sentinel_iv) = {
            let state = self.state.read();
            let enc = &state.preferences.encryption;
            match (
                &enc.salt_base64,
                &enc.test_ciphertext_base64,
                &enc.test_iv_base64,
            ) {
                (Some(salt), Some(ciphertext), Some(iv)) => {
                    (salt.clone(), enc.iterations, ciphertext.clone(), iv.clone())
                }
                _ => return Err(Error::VaultNotInitialized),
            }
        };

        let salt = BASE64
            .decode(&salt_base64)
            .map_err(|_| Error::SerializationFailed("stored salt is not valid base64".into()))?;

        if !verify_passphrase(passphrase, &salt, iterations, &sentinel_ciphertext, &sentinel_iv)
            .await?
        {
            tracing::debug!("unlock rejected");
            return Ok(false);
        }

        let key = derive_key(passphrase, &salt, iterations).await?;

        // Best-effort AI key recovery; a stale or corrupt ciphertext
        // degrades to "not configured", never to an unlock failure.
        let mut ai = self.state.read().preferences.ai.clone();
        let mut api_key = recover_api_key(&ai, &key);
        let mut migrated = false;
        if api_key.is_none() {
            let (legacy_key, did_migrate) = migrate_legacy_api_key(&mut ai, &key);
            api_key = legacy_key;
            migrated = did_migrate;
        }

        let migrated_prefs = {
            let mut state = self.state.write();
            state.key = Some(key);
            state.ai_api_key = api_key;
            if migrated {
                state.preferences.ai = ai;
            }
            migrated.then(|| state.preferences.clone())
        };

        if let Some(prefs) = migrated_prefs {
            // Best effort: if the rewrite fails, the plaintext key survives
            // in the old blob until the next successful save; the encrypted
            // copy is already in memory for this session.
            match self.store.save(&prefs).await {
                Ok(()) => tracing::info!("migrated legacy AI key to encrypted storage"),
                Err(e) => tracing::warn!("could not persist migrated AI key: {}", e),
            }
        }

        tracing::info!("vault unlocked");
        Ok(true)
    }

    /// Lock the vault, discarding the key and all in-memory secrets
    ///
    /// Single entry point for explicit lock, auto-lock, and shutdown paths.
    pub fn lock(&self) {
        let mut state = self.state.write();
        state.key = None;
        state.ai_api_key = None;
        tracing::debug!("vault locked");
    }

    /// Borrow the session key, or fail with `VaultLocked`
    ///
    /// The guard must not be held across an await point; callers seal or
    /// open payloads synchronously and drop it before touching storage.
    pub(crate) fn require_key(&self) -> Result<MappedRwLockReadGuard<'_, VaultKey>> {
        RwLockReadGuard::try_map(self.state.read(), |state| state.key.as_ref())
            .map_err(|_| Error::VaultLocked)
    }

    /// Change the color theme and persist
    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        let mut updated = self.preferences();
        updated.theme = theme;
        self.store.save(&updated).await?;
        self.state.write().preferences = updated;
        Ok(())
    }

    /// Change the font size and persist
    pub async fn set_font_size(&self, font_size: FontSize) -> Result<()> {
        let mut updated = self.preferences();
        updated.font_size = font_size;
        self.store.save(&updated).await?;
        self.state.write().preferences = updated;
        Ok(())
    }

    /// Update the AI configuration and persist
    ///
    /// A supplied plaintext API key is encrypted under the session key
    /// before persisting (requires an unlocked vault); the plaintext is
    /// kept only in memory. Passing `None` leaves any stored key untouched.
    pub async fn set_ai_config(
        &self,
        provider: AiProvider,
        remote_endpoint: Option<String>,
        remote_model: Option<String>,
        remote_api_key: Option<String>,
    ) -> Result<()> {
        let mut updated = self.preferences();
        updated.ai.provider = provider;
        updated.ai.remote_endpoint = remote_endpoint;
        updated.ai.remote_model = remote_model;

        if let Some(ref plaintext) = remote_api_key {
            let sealed = {
                let key = self.require_key()?;
                encrypt(plaintext, &key)?
            };
            updated.ai.remote_api_key_ciphertext = Some(sealed.ciphertext_base64);
            updated.ai.remote_api_key_iv = Some(sealed.iv_base64);
        }

        self.store.save(&updated).await?;

        let mut state = self.state.write();
        state.preferences = updated;
        if remote_api_key.is_some() {
            state.ai_api_key = remote_api_key;
        }
        Ok(())
    }
}

/// Decrypt the stored AI API key ciphertext, if present
///
/// Best effort by contract: any failure (missing IV, wrong key after a
/// restore from another vault, corrupt data) returns `None`.
fn recover_api_key(ai: &AiConfig, key: &VaultKey) -> Option<String> {
    let ciphertext = ai.remote_api_key_ciphertext.as_ref()?;
    let iv = ai.remote_api_key_iv.as_ref()?;

    match decrypt::<String>(ciphertext, iv, key) {
        Ok(plaintext) => Some(plaintext),
        Err(e) => {
            tracing::debug!("stored AI key not recoverable, treating as unset: {}", e);
            None
        }
    }
}

/// Migrate a legacy plaintext API key to encrypted form
///
/// Returns the plaintext key (usable for this session either way) and
/// whether the config was rewritten. The caller persists the rewritten
/// config as a separate step; this function only transforms the value.
fn migrate_legacy_api_key(ai: &mut AiConfig, key: &VaultKey) -> (Option<String>, bool) {
    let Some(plaintext) = ai.legacy_remote_api_key.clone() else {
        return (None, false);
    };

    match encrypt(&plaintext, key) {
        Ok(sealed) => {
            ai.remote_api_key_ciphertext = Some(sealed.ciphertext_base64);
            ai.remote_api_key_iv = Some(sealed.iv_base64);
            ai.legacy_remote_api_key = None;
            (Some(plaintext), true)
        }
        Err(e) => {
            tracing::warn!("legacy AI key migration failed: {}", e);
            (Some(plaintext), false)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
