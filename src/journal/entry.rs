//! # Journal Entry
//!
//! A single journal entry authored by the user. Stored encrypted at rest
//! inside an [`Envelope`](crate::storage::Envelope); only id and timestamps
//! ever appear in plaintext.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::journal::TagId;
use crate::time::now_iso;

/// Identifier of a journal entry (UUID v4)
pub type EntryId = String;

/// Maximum accepted title length in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum accepted content length in characters
pub const MAX_CONTENT_LENGTH: usize = 100_000;

/// How the author felt when writing the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Best day
    Great,
    /// Good day
    Good,
    /// Neither good nor bad
    Neutral,
    /// Bad day
    Bad,
    /// Worst day
    Awful,
}

/// A journal entry
///
/// `word_count` is derived state: it always equals the whitespace-token
/// count of `content` and is recomputed whenever the content changes.
/// `is_deleted` implements soft deletion; a soft-deleted entry remains a
/// normal envelope in storage and is filtered out when listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Unique identifier, plaintext-indexable
    pub id: EntryId,
    /// Creation timestamp, immutable after construction
    pub created_at: String,
    /// Last modification timestamp; drives ordering and merge decisions
    pub updated_at: String,
    /// Entry title
    pub title: String,
    /// Entry body (markdown plaintext)
    pub content: String,
    /// Optional mood annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    /// Tag ids in insertion order (order preserved for display)
    pub tags: Vec<TagId>,
    /// Whitespace-token count of `content`
    pub word_count: usize,
    /// Soft-delete flag
    pub is_deleted: bool,
}

impl JournalEntry {
    /// Create a new entry with a fresh id and timestamps
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        let title = title.into();
        let content = content.into();
        validate(&title, &content)?;

        let now = now_iso();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            created_at: now.clone(),
            updated_at: now,
            word_count: count_words(&content),
            title,
            content,
            mood: None,
            tags: Vec::new(),
            is_deleted: false,
        })
    }

    /// Attach a mood (builder form, used at creation time)
    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    /// Attach tags (builder form, used at creation time)
    pub fn with_tags(mut self, tags: Vec<TagId>) -> Self {
        self.tags = tags;
        self
    }

    /// Replace title and content, recomputing the word count
    pub fn edit(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<()> {
        let title = title.into();
        let content = content.into();
        validate(&title, &content)?;

        self.word_count = count_words(&content);
        self.title = title;
        self.content = content;
        self.updated_at = now_iso();
        Ok(())
    }

    /// Replace the mood annotation
    pub fn set_mood(&mut self, mood: Option<Mood>) {
        self.mood = mood;
        self.updated_at = now_iso();
    }

    /// Replace the tag set
    pub fn set_tags(&mut self, tags: Vec<TagId>) {
        self.tags = tags;
        self.updated_at = now_iso();
    }

    /// Flag the entry as soft-deleted and bump `updated_at`
    pub fn mark_deleted(&mut self) {
        self.is_deleted = true;
        self.updated_at = now_iso();
    }
}

fn validate(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::ValidationFailed("title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::ValidationFailed(format!(
            "title exceeds {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(Error::ValidationFailed(format!(
            "content exceeds {} characters",
            MAX_CONTENT_LENGTH
        )));
    }
    Ok(())
}

/// Count whitespace-separated tokens in a string
///
/// Consecutive whitespace and newlines count as a single separator.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_computes_word_count() {
        let entry = JournalEntry::new("T", "hello world").unwrap();

        assert_eq!(entry.word_count, 2);
        assert_eq!(entry.created_at, entry.updated_at);
        assert!(!entry.is_deleted);
        assert!(entry.tags.is_empty());
    }

    #[test]
    fn test_count_words_handles_messy_whitespace() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("  one\n\ttwo   three  "), 3);
    }

    #[test]
    fn test_edit_recomputes_word_count() {
        let mut entry = JournalEntry::new("T", "hello world").unwrap();
        entry.edit("T2", "one two three four").unwrap();

        assert_eq!(entry.word_count, 4);
        assert_eq!(entry.title, "T2");
    }

    #[test]
    fn test_empty_title_rejected() {
        let result = JournalEntry::new("   ", "content");
        assert!(matches!(result, Err(Error::ValidationFailed(_))));
    }

    #[test]
    fn test_oversized_title_rejected() {
        let long_title = "x".repeat(MAX_TITLE_LENGTH + 1);
        let result = JournalEntry::new(long_title, "content");
        assert!(matches!(result, Err(Error::ValidationFailed(_))));
    }

    #[test]
    fn test_mark_deleted_bumps_updated_at() {
        let mut entry = JournalEntry::new("T", "content").unwrap();
        let before = entry.updated_at.clone();
        // RFC 3339 millis: make sure the clock can tick
        std::thread::sleep(std::time::Duration::from_millis(2));
        entry.mark_deleted();

        assert!(entry.is_deleted);
        assert!(entry.updated_at > before);
    }

    #[test]
    fn test_serde_shape_matches_wire_format() {
        let entry = JournalEntry::new("T", "hello world")
            .unwrap()
            .with_mood(Mood::Good);
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json.get("createdAt").is_some());
        assert!(json.get("wordCount").is_some());
        assert!(json.get("isDeleted").is_some());
        assert_eq!(json["mood"], "good");
    }
}
