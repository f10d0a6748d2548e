//! # Authenticated Encryption
//!
//! AES-256-GCM over the canonical JSON bytes of a record.
//!
//! Every call to [`encrypt`] draws a fresh random 96-bit IV: **an IV is
//! never reused with the same key**. Decryption distinguishes three failure
//! classes so callers can react correctly:
//!
//! | Failure | Error | Meaning |
//! |---------|-------|---------|
//! | bad base64 / wrong-length IV | `SerializationFailed` | malformed input |
//! | GCM tag mismatch | `DecryptionFailed` | wrong key, wrong IV, or tampering |
//! | invalid JSON after decrypt | `SerializationFailed` | schema drift |

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

use super::{derive_key, VaultKey, IV_SIZE};

/// Result of encrypting a payload: ciphertext and IV, both base64
///
/// These two strings are everything needed (besides the key) to recover the
/// plaintext; they map directly onto the `ciphertextBase64` / `ivBase64`
/// fields of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// AES-256-GCM ciphertext with appended auth tag, base64-encoded
    pub ciphertext_base64: String,
    /// The 12-byte IV used for this encryption, base64-encoded
    pub iv_base64: String,
}

/// Encrypt a serializable payload under the vault key
///
/// The payload is serialized to JSON bytes first, so anything the vault
/// stores round-trips through the same representation used by exported
/// backups.
pub fn encrypt<T: Serialize>(payload: &T, key: &VaultKey) -> Result<EncryptedPayload> {
    let plaintext = Zeroizing::new(serde_json::to_vec(payload)?);

    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::EncryptionFailed(format!("invalid key length: {}", e)))?;

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&iv), plaintext.as_slice())
        .map_err(|_| Error::EncryptionFailed("AES-GCM encryption failed".into()))?;

    Ok(EncryptedPayload {
        ciphertext_base64: BASE64.encode(ciphertext),
        iv_base64: BASE64.encode(iv),
    })
}

/// Decrypt a payload previously produced by [`encrypt`]
///
/// ## Errors
///
/// - `SerializationFailed` for malformed input (bad base64, wrong IV
///   length, or JSON that no longer matches `T`)
/// - `DecryptionFailed` when the authentication tag does not verify
pub fn decrypt<T: DeserializeOwned>(
    ciphertext_base64: &str,
    iv_base64: &str,
    key: &VaultKey,
) -> Result<T> {
    let ciphertext = BASE64
        .decode(ciphertext_base64)
        .map_err(|_| Error::SerializationFailed("ciphertext is not valid base64".into()))?;
    let iv = BASE64
        .decode(iv_base64)
        .map_err(|_| Error::SerializationFailed("IV is not valid base64".into()))?;

    if iv.len() != IV_SIZE {
        return Err(Error::SerializationFailed(format!(
            "IV must be {} bytes, got {}",
            IV_SIZE,
            iv.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::EncryptionFailed(format!("invalid key length: {}", e)))?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(AesNonce::from_slice(&iv), ciphertext.as_slice())
            .map_err(|_| Error::DecryptionFailed)?,
    );

    Ok(serde_json::from_slice(&plaintext)?)
}

/// Test whether a candidate passphrase matches the vault
///
/// Derives a key from the candidate and attempts to decrypt the persisted
/// sentinel ciphertext. A failed authentication means "wrong passphrase"
/// and returns `Ok(false)`; any other error kind (malformed sentinel,
/// executor failure) is re-raised rather than conflated with it.
pub async fn verify_passphrase(
    passphrase: &str,
    salt: &[u8],
    iterations: u32,
    sentinel_ciphertext_base64: &str,
    sentinel_iv_base64: &str,
) -> Result<bool> {
    let key = derive_key(passphrase, salt, iterations).await?;
    match decrypt::<String>(sentinel_ciphertext_base64, sentinel_iv_base64, &key) {
        Ok(_) => Ok(true),
        Err(Error::DecryptionFailed) => Ok(false),
        Err(e) => Err(e),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{generate_salt, KEY_SIZE};
    use serde::Deserialize;

    const TEST_ITERATIONS: u32 = 1_000;

    fn test_key(byte: u8) -> VaultKey {
        VaultKey::from_bytes([byte; KEY_SIZE])
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        body: String,
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = test_key(42);
        let note = Note {
            title: "T".into(),
            body: "hello world".into(),
        };

        let sealed = encrypt(&note, &key).unwrap();
        let opened: Note = decrypt(&sealed.ciphertext_base64, &sealed.iv_base64, &key).unwrap();

        assert_eq!(opened, note);
    }

    #[test]
    fn test_ciphertext_does_not_leak_plaintext() {
        let key = test_key(42);
        let note = Note {
            title: "very secret title".into(),
            body: "the body nobody may read".into(),
        };

        let sealed = encrypt(&note, &key).unwrap();
        let json = serde_json::to_string(&note).unwrap();

        // No JSON substring of 4+ chars may appear in the encoded ciphertext.
        for window in json.as_bytes().windows(4) {
            let fragment = std::str::from_utf8(window).unwrap();
            assert!(
                !sealed.ciphertext_base64.contains(fragment),
                "ciphertext leaks plaintext fragment {:?}",
                fragment
            );
        }
    }

    #[test]
    fn test_wrong_key_fails_with_decryption_error() {
        let note = Note {
            title: "T".into(),
            body: "B".into(),
        };
        let sealed = encrypt(&note, &test_key(1)).unwrap();

        let result = decrypt::<Note>(&sealed.ciphertext_base64, &sealed.iv_base64, &test_key(2));
        assert!(matches!(result, Err(Error::DecryptionFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails_with_decryption_error() {
        let key = test_key(42);
        let sealed = encrypt(&"payload".to_string(), &key).unwrap();

        let mut raw = BASE64.decode(&sealed.ciphertext_base64).unwrap();
        raw[0] ^= 0xFF;
        let tampered = BASE64.encode(raw);

        let result = decrypt::<String>(&tampered, &sealed.iv_base64, &key);
        assert!(matches!(result, Err(Error::DecryptionFailed)));
    }

    #[test]
    fn test_malformed_input_is_not_a_decryption_error() {
        let key = test_key(42);

        let result = decrypt::<String>("not base64 at all!!", "also not", &key);
        assert!(matches!(result, Err(Error::SerializationFailed(_))));

        let sealed = encrypt(&"payload".to_string(), &key).unwrap();
        let short_iv = BASE64.encode([0u8; 4]);
        let result = decrypt::<String>(&sealed.ciphertext_base64, &short_iv, &key);
        assert!(matches!(result, Err(Error::SerializationFailed(_))));
    }

    #[test]
    fn test_fresh_iv_every_call() {
        let key = test_key(42);

        let a = encrypt(&"same payload".to_string(), &key).unwrap();
        let b = encrypt(&"same payload".to_string(), &key).unwrap();

        assert_ne!(a.iv_base64, b.iv_base64);
        assert_ne!(a.ciphertext_base64, b.ciphertext_base64);
    }

    #[tokio::test]
    async fn test_verify_passphrase_accepts_correct_rejects_wrong() {
        let salt = generate_salt();
        let key = derive_key("correct-horse-battery", &salt, TEST_ITERATIONS)
            .await
            .unwrap();
        let sentinel = encrypt(&"sentinel".to_string(), &key).unwrap();

        let ok = verify_passphrase(
            "correct-horse-battery",
            &salt,
            TEST_ITERATIONS,
            &sentinel.ciphertext_base64,
            &sentinel.iv_base64,
        )
        .await
        .unwrap();
        assert!(ok);

        let ok = verify_passphrase(
            "wrong-pass",
            &salt,
            TEST_ITERATIONS,
            &sentinel.ciphertext_base64,
            &sentinel.iv_base64,
        )
        .await
        .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_verify_passphrase_reraises_malformed_sentinel() {
        let salt = generate_salt();

        let result =
            verify_passphrase("any", &salt, TEST_ITERATIONS, "garbage!!", "garbage!!").await;
        assert!(matches!(result, Err(Error::SerializationFailed(_))));
    }
}
