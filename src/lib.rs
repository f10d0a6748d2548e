//! # Journly Core
//!
//! The local encrypted-vault core of an offline-first personal journal.
//! Everything the user writes is encrypted on-device under a
//! passphrase-derived key before it touches storage; backups move whole
//! ciphertext envelopes and merge last-write-wins across devices.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        JOURNLY CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   UI layer (out of scope)                                               │
//! │        │ plaintext records in/out                                       │
//! │        ▼                                                                │
//! │  ┌─────────────┐     ┌─────────────┐     ┌──────────────────────────┐   │
//! │  │ Repositories│ ──► │   Crypto    │     │   Vault Session          │   │
//! │  │ entries /   │     │ PBKDF2 +    │ ◄── │ setup / unlock / lock    │   │
//! │  │ stories     │     │ AES-256-GCM │     │ holds the key in memory  │   │
//! │  └──────┬──────┘     └─────────────┘     └──────────────────────────┘   │
//! │         │ ciphertext envelopes                                          │
//! │         ▼                                                               │
//! │  ┌─────────────┐     ┌─────────────┐     ┌──────────────────────────┐   │
//! │  │   Storage   │ ◄── │    Sync     │ ──► │ Remote blob store        │   │
//! │  │ SQLite      │     │ LWW merge   │     │ (Drive appDataFolder)    │   │
//! │  └─────────────┘     └─────────────┘     └──────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Key derivation and authenticated encryption
//! - [`journal`] - Plaintext domain records (entries, stories, tags)
//! - [`preferences`] - The persisted configuration document
//! - [`storage`] - Envelope persistence (SQLite) and backup payloads
//! - [`vault`] - The vault session: lock state and key custody
//! - [`repository`] - Encrypt/decrypt mapping between records and envelopes
//! - [`sync`] - Push/pull backup with last-write-wins merge
//! - [`ai`] - Story-generation provider contract and remote adapter
//!
//! ## Security Model
//!
//! | Layer | Mechanism |
//! |-------|-----------|
//! | Key custody | Key derived per unlock, held in memory, zeroized on lock |
//! | At rest | AES-256-GCM per record, fresh IV per write |
//! | Passphrase check | Sentinel ciphertext; wrong passphrase and corrupt data are indistinguishable |
//! | Backup | Envelopes leave the device as ciphertext only |
//! | AI credentials | API key persisted encrypted; plaintext lives in session memory only |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod ai;
pub mod crypto;
pub mod error;
pub mod journal;
pub mod preferences;
pub mod repository;
pub mod storage;
pub mod sync;
/// Time utilities for plaintext envelope timestamps.
pub mod time;
pub mod vault;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use error::{Error, Result};
pub use journal::{JournalEntry, Mood, Story, Tag};
pub use repository::{EntryRepository, StoryRepository};
pub use storage::{Envelope, EnvelopeKind, Pagination, SqliteStorage};
pub use sync::SyncService;
pub use vault::{AutoLock, VaultSession};

// ============================================================================
// END-TO-END TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::UserPreferences;
    use crate::storage::PreferenceStore;
    use std::sync::Arc;

    /// Full journal lifecycle against one device: set up the vault, write,
    /// lock, unlock, read back; a wrong passphrase never opens the vault.
    #[tokio::test]
    async fn test_end_to_end_vault_lifecycle() {
        let storage = Arc::new(SqliteStorage::open(None).await.unwrap());
        let mut prefs = UserPreferences::default();
        prefs.encryption.iterations = 1_000;
        storage.save(&prefs).await.unwrap();

        let session = Arc::new(VaultSession::load(storage.clone()).await.unwrap());
        let entries = EntryRepository::new(storage.clone(), session.clone());

        // Setup and write
        session.setup("correct-horse-battery").await.unwrap();
        let entry = JournalEntry::new("T", "hello world").unwrap();
        assert_eq!(entry.word_count, 2);
        entries.save(&entry).await.unwrap();

        // Lock: plaintext becomes unreachable
        session.lock();
        assert!(matches!(
            entries.find_all(Pagination::default()).await,
            Err(Error::VaultLocked)
        ));

        // Wrong passphrase: still locked
        let ok = session.unlock("wrong-pass").await.unwrap();
        assert!(!ok);
        assert!(!session.is_unlocked());

        // Correct passphrase: content round-trips
        let ok = session.unlock("correct-horse-battery").await.unwrap();
        assert!(ok);

        let listed = entries.find_all(Pagination::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "T");
        assert_eq!(listed[0].content, "hello world");
        assert_eq!(listed[0].word_count, 2);
    }

    /// Entries and stories share one envelope store without interfering.
    #[tokio::test]
    async fn test_entries_and_stories_coexist() {
        let storage = Arc::new(SqliteStorage::open(None).await.unwrap());
        let mut prefs = UserPreferences::default();
        prefs.encryption.iterations = 1_000;
        storage.save(&prefs).await.unwrap();

        let session = Arc::new(VaultSession::load(storage.clone()).await.unwrap());
        session.setup("correct-horse-battery").await.unwrap();

        let entries = EntryRepository::new(storage.clone(), session.clone());
        let stories = StoryRepository::new(storage.clone(), session.clone());

        let entry = JournalEntry::new("entry", "journal words").unwrap();
        entries.save(&entry).await.unwrap();

        let story = Story::new(
            "story",
            "Derived narrative",
            vec![entry.id.clone()],
            "hopeful",
            ai::ProviderKind::Remote,
        )
        .unwrap();
        stories.save(&story).await.unwrap();

        use crate::storage::EnvelopeStore;
        assert_eq!(storage.count(EnvelopeKind::Entry).await.unwrap(), 1);
        assert_eq!(storage.count(EnvelopeKind::Story).await.unwrap(), 1);

        assert_eq!(entries.find_all(Pagination::default()).await.unwrap().len(), 1);
        let loaded = stories.find_all(Pagination::default()).await.unwrap();
        assert_eq!(loaded[0].source_entry_ids, vec![entry.id.clone()]);
    }
}
