//! # Local Backup Payloads
//!
//! Envelope export/import in the backup file format. Envelopes travel as
//! ciphertext; a backup file is exactly as private as the database it came
//! from. Writing the JSON to disk or a share sheet is a platform concern
//! outside this crate; callers get the payload and serialize it themselves.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time::now_iso;

use super::{Envelope, EnvelopeStore};

/// A local backup file: `{ version, exportedAt, envelopes }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    /// Application version that produced the backup
    pub version: String,
    /// When the backup was produced (RFC 3339 UTC)
    pub exported_at: String,
    /// Every envelope, still encrypted
    pub envelopes: Vec<Envelope>,
}

/// Export every envelope into a backup payload
pub async fn export_payload(store: &dyn EnvelopeStore) -> Result<ExportPayload> {
    let envelopes = store.export_all().await?;
    Ok(ExportPayload {
        version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: now_iso(),
        envelopes,
    })
}

/// Import a backup payload, upserting every envelope by id
///
/// Returns the number of envelopes imported. An empty envelope list is
/// rejected as a malformed backup rather than silently importing nothing.
pub async fn import_payload(store: &dyn EnvelopeStore, payload: &ExportPayload) -> Result<usize> {
    if payload.envelopes.is_empty() {
        return Err(Error::ValidationFailed(
            "backup file contains no envelopes".into(),
        ));
    }

    store.import_all(&payload.envelopes).await?;
    tracing::info!(imported = payload.envelopes.len(), "imported backup payload");

    Ok(payload.envelopes.len())
}
