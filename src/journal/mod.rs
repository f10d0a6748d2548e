//! # Journal Domain Records
//!
//! The plaintext domain records the vault protects: journal entries,
//! AI-derived stories, and the tags used to organize entries. Records in
//! this module never reach storage directly; the repositories serialize
//! them to JSON, encrypt them, and wrap them in envelopes.

mod entry;
mod story;
mod tag;

pub use entry::{count_words, EntryId, JournalEntry, Mood, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH};
pub use story::{Story, StoryId};
pub use tag::{Tag, TagId, DEFAULT_TAG_COLOR};
