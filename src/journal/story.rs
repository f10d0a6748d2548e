//! # Story
//!
//! An AI-generated narrative derived from one or more journal entries.
//! Stories are immutable snapshots: once created they can only be read or
//! deleted, never updated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai::ProviderKind;
use crate::error::{Error, Result};
use crate::journal::EntryId;
use crate::time::now_iso;

/// Identifier of a story (UUID v4)
pub type StoryId = String;

/// An AI-generated story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Unique identifier, plaintext-indexable
    pub id: StoryId,
    /// Creation timestamp, immutable (stories have no update path)
    pub created_at: String,
    /// Story title
    pub title: String,
    /// The generated narrative
    pub content: String,
    /// Entries the story was derived from, in the order they were used
    pub source_entry_ids: Vec<EntryId>,
    /// The theme/instruction the story was generated with
    pub prompt: String,
    /// Which provider produced the story
    pub provider: ProviderKind,
}

impl Story {
    /// Create a new story with a fresh id and creation timestamp
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        source_entry_ids: Vec<EntryId>,
        prompt: impl Into<String>,
        provider: ProviderKind,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::ValidationFailed("story title cannot be empty".into()));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            created_at: now_iso(),
            title,
            content: content.into(),
            source_entry_ids,
            prompt: prompt.into(),
            provider,
        })
    }
}
