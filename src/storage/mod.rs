//! # Storage Module
//!
//! Persistence for encrypted envelopes and the preferences blob.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Repositories (plaintext in/out)                                        │
//! │        │                                                                │
//! │        ▼ encrypt / decrypt at the boundary                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  EnvelopeStore trait                                            │   │
//! │  │  ───────────────────                                            │   │
//! │  │  put / get / list_by_kind / delete / count                      │   │
//! │  │  export_all / import_all / clear                                │   │
//! │  │                                                                 │   │
//! │  │  Sees only ciphertext plus plaintext id/type/timestamps.        │   │
//! │  └───────────────────────────┬─────────────────────────────────────┘   │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SqliteStorage (rusqlite)                                       │   │
//! │  │  • envelopes table, indexed by id and (type, updated_at)        │   │
//! │  │  • preferences table (single JSON row)                          │   │
//! │  │  • in-memory database for tests                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod backup;
mod database;
mod schema;

pub use backup::{export_payload, import_payload, ExportPayload};
pub use database::SqliteStorage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::preferences::UserPreferences;

/// Default page size for envelope listings
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Discriminator for the kind of record an envelope wraps (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    /// A journal entry
    Entry,
    /// An AI-generated story
    Story,
}

impl EnvelopeKind {
    /// Every envelope kind, for exhaustive sweeps (counts, clears)
    pub const ALL: [EnvelopeKind; 2] = [EnvelopeKind::Entry, EnvelopeKind::Story];

    /// The storage/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeKind::Entry => "entry",
            EnvelopeKind::Story => "story",
        }
    }
}

impl FromStr for EnvelopeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "entry" => Ok(EnvelopeKind::Entry),
            "story" => Ok(EnvelopeKind::Story),
            other => Err(Error::SerializationFailed(format!(
                "unknown envelope type: {}",
                other
            ))),
        }
    }
}

/// The encrypted-at-rest storage unit
///
/// Wraps one domain record. `ciphertext_base64` and `iv_base64` together
/// fully determine the plaintext under the active vault key; every other
/// field is non-sensitive metadata used for indexing, sorting, and the
/// last-write-wins merge. No other field may leak record content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Plaintext id, equal to the wrapped record's id
    pub id: String,
    /// Record kind discriminator
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    /// AES-256-GCM ciphertext with auth tag, base64
    pub ciphertext_base64: String,
    /// Per-record 12-byte IV, base64
    pub iv_base64: String,
    /// Plaintext creation timestamp (RFC 3339 UTC)
    pub created_at: String,
    /// Plaintext modification timestamp; sort key and merge tiebreaker
    pub updated_at: String,
}

/// Offset/limit window for envelope listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Rows to skip
    pub offset: u64,
    /// Maximum rows to return
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// A specific window
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// No window: every row. Used by the full-scan repository operations
    /// that must consider all envelopes before filtering.
    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: u64::MAX,
        }
    }
}

/// Persistence capability for encrypted envelopes
///
/// Implementations never see plaintext record content; pagination and
/// ordering operate purely on the plaintext metadata columns.
#[async_trait]
pub trait EnvelopeStore: Send + Sync {
    /// Store or update an envelope (upsert keyed by id)
    async fn put(&self, envelope: &Envelope) -> Result<()>;

    /// Fetch an envelope by id; `None` when absent (never an error)
    async fn get(&self, id: &str) -> Result<Option<Envelope>>;

    /// List envelopes of one kind, ordered by `updated_at` descending,
    /// with offset/limit applied before any decryption can happen
    async fn list_by_kind(&self, kind: EnvelopeKind, page: Pagination) -> Result<Vec<Envelope>>;

    /// Permanently remove an envelope; returns whether one existed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Count envelopes of one kind
    async fn count(&self, kind: EnvelopeKind) -> Result<u64>;

    /// Export every envelope (all kinds), for backup
    async fn export_all(&self) -> Result<Vec<Envelope>>;

    /// Bulk upsert-by-id, in a single transaction
    async fn import_all(&self, envelopes: &[Envelope]) -> Result<()>;

    /// Delete every envelope of every kind (factory reset)
    async fn clear(&self) -> Result<()>;
}

/// Persistence capability for the preferences document
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load the persisted preferences, or `None` on first launch
    async fn load(&self) -> Result<Option<UserPreferences>>;

    /// Persist the preferences document
    async fn save(&self, preferences: &UserPreferences) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_kind_round_trip() {
        for kind in EnvelopeKind::ALL {
            assert_eq!(kind.as_str().parse::<EnvelopeKind>().unwrap(), kind);
        }
        assert!("banana".parse::<EnvelopeKind>().is_err());
    }

    #[test]
    fn test_envelope_serde_shape_matches_wire_format() {
        let envelope = Envelope {
            id: "abc".into(),
            kind: EnvelopeKind::Entry,
            ciphertext_base64: "Y2lwaGVy".into(),
            iv_base64: "aXZpdml2aXZpdg==".into(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
            updated_at: "2024-01-02T00:00:00.000Z".into(),
        };

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "entry");
        assert!(json.get("ciphertextBase64").is_some());
        assert!(json.get("ivBase64").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
