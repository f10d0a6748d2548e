//! # Cryptography Module
//!
//! Cryptographic primitives for the encrypted vault.
//!
//! ## Key Hierarchy & Encryption Scheme
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    VAULT CRYPTOGRAPHY                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  User Passphrase                                                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  PBKDF2-HMAC-SHA256(passphrase, salt, 600 000 rounds)                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Vault Key (256 bits, in-memory only, zeroized on drop)                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  AES-256-GCM(key, random 96-bit IV, serde_json(record))                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  (ciphertext+tag, IV) both base64 → stored inside an Envelope           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | PBKDF2-HMAC-SHA256 | Passphrase KDF | Salted, iterated, resists offline brute force |
//! | AES-256-GCM | Record encryption | AEAD: confidentiality and tamper detection in one |
//! | OsRng | Salts and IVs | Operating system CSPRNG |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: the vault key is zeroized when dropped
//! 2. **No Key Extraction**: `VaultKey` exposes no public byte accessor
//! 3. **No IV Reuse**: every encryption draws a fresh random 96-bit IV
//! 4. **Single Failure Signal**: wrong key and tampered data both surface
//!    as [`Error::DecryptionFailed`](crate::error::Error::DecryptionFailed)

mod cipher;
mod kdf;

pub use cipher::{decrypt, encrypt, verify_passphrase, EncryptedPayload};
pub use kdf::{derive_key, generate_salt, VaultKey};

/// Size of the derived vault key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM IV in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Size of the key-derivation salt in bytes
pub const SALT_SIZE: usize = 16;

/// Default PBKDF2 iteration count for passphrase derivation
pub const PBKDF2_ITERATIONS: u32 = 600_000;
