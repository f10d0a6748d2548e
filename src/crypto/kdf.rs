//! # Key Derivation
//!
//! Derives the vault key from the user's passphrase.
//!
//! The derivation is PBKDF2-HMAC-SHA256 over a random 16-byte salt with a
//! large iteration count (600 000 by default). The salt is public and
//! persisted with the preferences; the iteration count is persisted next to
//! it so old vaults keep unlocking if the default ever changes.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::error::{Error, Result};

use super::{KEY_SIZE, SALT_SIZE};

/// The unlocked vault key
///
/// Exists only in process memory for the lifetime of an unlocked session.
/// There is no public accessor for the raw bytes and the type is not
/// `Clone`, so the session is the single owner; the bytes are zeroized
/// when the session drops or replaces the key.
#[derive(ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_SIZE]);

impl VaultKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.write_str("VaultKey(..)")
    }
}

/// Derive a vault key from a passphrase
///
/// Deterministic for a given (passphrase, salt, iterations) triple. The
/// PBKDF2 loop is CPU-bound for hundreds of milliseconds, so it runs on the
/// blocking pool rather than the async executor.
///
/// ## Errors
///
/// Returns `KeyDerivationFailed` only on executor failure; this is treated
/// as fatal by callers, not retried.
pub async fn derive_key(passphrase: &str, salt: &[u8], iterations: u32) -> Result<VaultKey> {
    let passphrase = Zeroizing::new(passphrase.to_owned());
    let salt = salt.to_vec();

    let key = tokio::task::spawn_blocking(move || {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), &salt, iterations, &mut key);
        key
    })
    .await
    .map_err(|e| Error::KeyDerivationFailed(format!("derivation task failed: {}", e)))?;

    Ok(VaultKey::from_bytes(key))
}

/// Generate a random 16-byte key-derivation salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Low iteration count keeps the test suite fast; the derivation path is
    // identical at any count.
    const TEST_ITERATIONS: u32 = 1_000;

    #[tokio::test]
    async fn test_derive_key_deterministic() {
        let salt = [7u8; SALT_SIZE];

        let key1 = derive_key("correct-horse-battery", &salt, TEST_ITERATIONS)
            .await
            .unwrap();
        let key2 = derive_key("correct-horse-battery", &salt, TEST_ITERATIONS)
            .await
            .unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[tokio::test]
    async fn test_different_passphrases_different_keys() {
        let salt = [7u8; SALT_SIZE];

        let key1 = derive_key("passphrase-one", &salt, TEST_ITERATIONS).await.unwrap();
        let key2 = derive_key("passphrase-two", &salt, TEST_ITERATIONS).await.unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[tokio::test]
    async fn test_different_salts_different_keys() {
        let key1 = derive_key("same-passphrase", &[1u8; SALT_SIZE], TEST_ITERATIONS)
            .await
            .unwrap();
        let key2 = derive_key("same-passphrase", &[2u8; SALT_SIZE], TEST_ITERATIONS)
            .await
            .unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_generate_salt_length_and_uniqueness() {
        let a = generate_salt();
        let b = generate_salt();

        assert_eq!(a.len(), SALT_SIZE);
        assert_eq!(b.len(), SALT_SIZE);
        assert_ne!(a, b);
    }

    #[test]
    fn test_vault_key_debug_hides_bytes() {
        let key = VaultKey::from_bytes([42u8; KEY_SIZE]);
        assert_eq!(format!("{:?}", key), "VaultKey(..)");
    }
}
