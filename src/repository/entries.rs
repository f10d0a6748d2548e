//! # Entry Repository
//!
//! CRUD over journal entries, encrypted at the envelope boundary.
//!
//! Query strategy per operation:
//! - `find_all` paginates on the ciphertext metadata index *before* any
//!   decryption (decryption is the expensive step), then filters
//!   soft-deleted records from the decrypted page.
//! - `find_by_date_range` pre-filters on the plaintext `created_at`: a
//!   record excluded by its public timestamp is never decrypted.
//! - `find_by_tag` has no plaintext to filter on (tags live inside the
//!   ciphertext), so it is a deliberate full scan-and-decrypt. Fine at
//!   journal scale.

use std::sync::Arc;

use crate::crypto;
use crate::error::{Error, Result};
use crate::journal::{EntryId, JournalEntry, TagId};
use crate::storage::{Envelope, EnvelopeKind, EnvelopeStore, Pagination};
use crate::vault::VaultSession;

/// Repository for journal entries
pub struct EntryRepository {
    store: Arc<dyn EnvelopeStore>,
    session: Arc<VaultSession>,
}

impl EntryRepository {
    /// Create a repository over the given store and session
    pub fn new(store: Arc<dyn EnvelopeStore>, session: Arc<VaultSession>) -> Self {
        Self { store, session }
    }

    fn seal(&self, entry: &JournalEntry) -> Result<Envelope> {
        let key = self.session.require_key()?;
        let payload = crypto::encrypt(entry, &key)?;

        Ok(Envelope {
            id: entry.id.clone(),
            kind: EnvelopeKind::Entry,
            ciphertext_base64: payload.ciphertext_base64,
            iv_base64: payload.iv_base64,
            created_at: entry.created_at.clone(),
            updated_at: entry.updated_at.clone(),
        })
    }

    fn open(&self, envelope: &Envelope) -> Result<JournalEntry> {
        let key = self.session.require_key()?;
        crypto::decrypt(&envelope.ciphertext_base64, &envelope.iv_base64, &key)
    }

    /// Encrypt and upsert an entry (overwrite semantics keyed by id)
    pub async fn save(&self, entry: &JournalEntry) -> Result<()> {
        let envelope = self.seal(entry)?;
        self.store.put(&envelope).await
    }

    /// Fetch and decrypt one entry; `None` when the id is absent
    pub async fn find_by_id(&self, id: &str) -> Result<Option<JournalEntry>> {
        self.session.require_key()?;

        match self.store.get(id).await? {
            Some(envelope) => Ok(Some(self.open(&envelope)?)),
            None => Ok(None),
        }
    }

    /// List entries newest-first, excluding soft-deleted records
    pub async fn find_all(&self, page: Pagination) -> Result<Vec<JournalEntry>> {
        self.session.require_key()?;

        let envelopes = self.store.list_by_kind(EnvelopeKind::Entry, page).await?;
        let mut entries = Vec::with_capacity(envelopes.len());
        for envelope in &envelopes {
            let entry = self.open(envelope)?;
            if !entry.is_deleted {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// List entries created inside `[start, end]` (inclusive, RFC 3339)
    pub async fn find_by_date_range(&self, start: &str, end: &str) -> Result<Vec<JournalEntry>> {
        self.session.require_key()?;

        let envelopes = self
            .store
            .list_by_kind(EnvelopeKind::Entry, Pagination::all())
            .await?;

        let mut entries = Vec::new();
        for envelope in &envelopes {
            // Plaintext timestamp filter first; out-of-range records are
            // never decrypted.
            if envelope.created_at.as_str() < start || envelope.created_at.as_str() > end {
                continue;
            }
            let entry = self.open(envelope)?;
            if !entry.is_deleted {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// List entries carrying the given tag
    pub async fn find_by_tag(&self, tag_id: &TagId) -> Result<Vec<JournalEntry>> {
        self.session.require_key()?;

        let envelopes = self
            .store
            .list_by_kind(EnvelopeKind::Entry, Pagination::all())
            .await?;

        let mut entries = Vec::new();
        for envelope in &envelopes {
            let entry = self.open(envelope)?;
            if !entry.is_deleted && entry.tags.contains(tag_id) {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Soft-delete: flag the record, bump `updated_at`, re-encrypt, re-save
    pub async fn soft_delete(&self, id: &EntryId) -> Result<()> {
        let mut entry = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::EntryNotFound(id.clone()))?;

        entry.mark_deleted();
        self.save(&entry).await
    }

    /// Hard-delete: remove the envelope entirely, bypassing decryption
    pub async fn hard_delete(&self, id: &EntryId) -> Result<()> {
        self.session.require_key()?;
        self.store.delete(id).await?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
