//! # Backup Sync
//!
//! Push/pull of the full encrypted envelope set against a remote blob
//! store, merging by last-write-wins on the plaintext `updatedAt`.
//!
//! ## Merge Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    LAST-WRITE-WINS MERGE (pull)                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  for each remote envelope:                                             │
//! │                                                                         │
//! │    no local copy?          ──► insert             (counted as added)   │
//! │    remote.updatedAt newer? ──► overwrite local    (counted as updated) │
//! │    otherwise               ──► keep local, skip                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The merge operates on whole envelopes: the service only ever sees
//! ciphertext, so no field-level reconciliation is possible. Two devices
//! editing different fields of the same record concurrently will lose the
//! strictly-older copy. Accepted for a single-owner-multi-device journal;
//! this is not a collaboration system.
//!
//! Push uploads one blob containing every envelope, so a push either lands
//! completely or not at all; partial uploads are not modeled.

mod drive;
mod transport;

pub use drive::{DriveTransport, BACKUP_OBJECT_NAME};
pub use transport::{BlobTransport, StaticToken, TokenProvider};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::storage::{Envelope, EnvelopeStore};
use crate::time::now_iso;

/// The remote backup blob: `{ version, syncedAt, envelopes }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    /// Application version that produced the blob
    pub version: String,
    /// Push timestamp (RFC 3339 UTC)
    pub synced_at: String,
    /// Every envelope, still encrypted
    pub envelopes: Vec<Envelope>,
}

/// Result of a push
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// Number of envelopes uploaded
    pub uploaded: usize,
}

/// Result of a pull
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullOutcome {
    /// Total changed records (`added + updated`)
    pub merged: usize,
    /// Remote envelopes with no local counterpart, inserted
    pub added: usize,
    /// Local envelopes overwritten by a strictly newer remote copy
    pub updated: usize,
}

/// Push/pull orchestrator
///
/// Moves whole envelopes between local storage and the remote transport.
/// Never touches plaintext or keys.
pub struct SyncService {
    transport: Arc<dyn BlobTransport>,
    store: Arc<dyn EnvelopeStore>,
}

impl SyncService {
    /// Create a service over the given transport and store
    pub fn new(transport: Arc<dyn BlobTransport>, store: Arc<dyn EnvelopeStore>) -> Self {
        Self { transport, store }
    }

    /// Export every local envelope and upload as a single blob
    pub async fn push(&self) -> Result<PushOutcome> {
        let envelopes = self.store.export_all().await?;
        let uploaded = envelopes.len();

        let payload = SyncPayload {
            version: env!("CARGO_PKG_VERSION").to_string(),
            synced_at: now_iso(),
            envelopes,
        };
        self.transport.upload(&payload).await?;

        tracing::info!(uploaded, "pushed backup blob");
        Ok(PushOutcome { uploaded })
    }

    /// Download the remote blob and merge last-write-wins into local storage
    ///
    /// A missing remote backup is a clean zero-merge result, not an error.
    pub async fn pull(&self) -> Result<PullOutcome> {
        let Some(object_id) = self.transport.find_backup_object().await? else {
            return Ok(PullOutcome::default());
        };

        let payload = self.transport.download(&object_id).await?;
        if payload.envelopes.is_empty() {
            return Ok(PullOutcome::default());
        }

        let mut added = 0;
        let mut updated = 0;

        for remote in &payload.envelopes {
            match self.store.get(&remote.id).await? {
                None => {
                    self.store.put(remote).await?;
                    added += 1;
                }
                Some(local) if remote.updated_at > local.updated_at => {
                    self.store.put(remote).await?;
                    updated += 1;
                }
                Some(_) => {
                    // Local copy is same age or newer; keep it.
                }
            }
        }

        tracing::info!(added, updated, "merged remote backup");
        Ok(PullOutcome {
            merged: added + updated,
            added,
            updated,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
