//! # Story Repository
//!
//! Create/read/delete over stories. Stories are immutable snapshots, so
//! there is no update path: the envelope's `updated_at` is pinned to the
//! story's `created_at` and never moves.

use std::sync::Arc;

use crate::crypto;
use crate::error::Result;
use crate::journal::{Story, StoryId};
use crate::storage::{Envelope, EnvelopeKind, EnvelopeStore, Pagination};
use crate::vault::VaultSession;

/// Repository for AI-generated stories
pub struct StoryRepository {
    store: Arc<dyn EnvelopeStore>,
    session: Arc<VaultSession>,
}

impl StoryRepository {
    /// Create a repository over the given store and session
    pub fn new(store: Arc<dyn EnvelopeStore>, session: Arc<VaultSession>) -> Self {
        Self { store, session }
    }

    fn seal(&self, story: &Story) -> Result<Envelope> {
        let key = self.session.require_key()?;
        let payload = crypto::encrypt(story, &key)?;

        Ok(Envelope {
            id: story.id.clone(),
            kind: EnvelopeKind::Story,
            ciphertext_base64: payload.ciphertext_base64,
            iv_base64: payload.iv_base64,
            created_at: story.created_at.clone(),
            updated_at: story.created_at.clone(),
        })
    }

    fn open(&self, envelope: &Envelope) -> Result<Story> {
        let key = self.session.require_key()?;
        crypto::decrypt(&envelope.ciphertext_base64, &envelope.iv_base64, &key)
    }

    /// Encrypt and store a story
    pub async fn save(&self, story: &Story) -> Result<()> {
        let envelope = self.seal(story)?;
        self.store.put(&envelope).await
    }

    /// Fetch and decrypt one story; `None` when the id is absent
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Story>> {
        self.session.require_key()?;

        match self.store.get(id).await? {
            Some(envelope) => Ok(Some(self.open(&envelope)?)),
            None => Ok(None),
        }
    }

    /// List stories newest-first
    pub async fn find_all(&self, page: Pagination) -> Result<Vec<Story>> {
        self.session.require_key()?;

        let envelopes = self.store.list_by_kind(EnvelopeKind::Story, page).await?;
        let mut stories = Vec::with_capacity(envelopes.len());
        for envelope in &envelopes {
            stories.push(self.open(envelope)?);
        }

        Ok(stories)
    }

    /// Remove a story permanently (stories have no soft delete)
    pub async fn delete(&self, id: &StoryId) -> Result<()> {
        self.session.require_key()?;
        self.store.delete(id).await?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ProviderKind;
    use crate::error::Error;
    use crate::preferences::UserPreferences;
    use crate::storage::{PreferenceStore, SqliteStorage};

    async fn test_fixture() -> (Arc<SqliteStorage>, Arc<VaultSession>, StoryRepository) {
        let storage = Arc::new(SqliteStorage::open(None).await.unwrap());

        let mut prefs = UserPreferences::default();
        prefs.encryption.iterations = 1_000;
        storage.save(&prefs).await.unwrap();

        let session = Arc::new(VaultSession::load(storage.clone()).await.unwrap());
        session.setup("correct-horse-battery").await.unwrap();

        let repo = StoryRepository::new(storage.clone(), session.clone());
        (storage, session, repo)
    }

    fn story(title: &str) -> Story {
        Story::new(
            title,
            "Once upon a time...",
            vec!["entry-1".into()],
            "hopeful",
            ProviderKind::Local,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find_round_trip() {
        let (_, _, repo) = test_fixture().await;
        let story = story("A week in spring");

        repo.save(&story).await.unwrap();
        let loaded = repo.find_by_id(&story.id).await.unwrap().unwrap();

        assert_eq!(loaded, story);
    }

    #[tokio::test]
    async fn test_envelope_updated_at_is_pinned_to_created_at() {
        let (storage, _, repo) = test_fixture().await;
        let story = story("pinned");
        repo.save(&story).await.unwrap();

        let envelope = storage.get(&story.id).await.unwrap().unwrap();
        assert_eq!(envelope.kind, EnvelopeKind::Story);
        assert_eq!(envelope.updated_at, story.created_at);
    }

    #[tokio::test]
    async fn test_delete_removes_story() {
        let (storage, _, repo) = test_fixture().await;
        let story = story("gone soon");
        repo.save(&story).await.unwrap();

        repo.delete(&story.id).await.unwrap();

        assert!(repo.find_by_id(&story.id).await.unwrap().is_none());
        assert!(storage.get(&story.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_locked_vault_rejects_operations() {
        let (_, session, repo) = test_fixture().await;
        let story = story("locked out");
        repo.save(&story).await.unwrap();

        session.lock();

        assert!(matches!(repo.save(&story).await, Err(Error::VaultLocked)));
        assert!(matches!(
            repo.find_all(Pagination::default()).await,
            Err(Error::VaultLocked)
        ));
        assert!(matches!(
            repo.delete(&story.id).await,
            Err(Error::VaultLocked)
        ));
    }
}
