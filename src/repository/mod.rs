//! # Repositories
//!
//! Map plaintext domain records to encrypted envelopes and back.
//!
//! Every operation gates on the vault session key; a locked vault surfaces
//! [`Error::VaultLocked`](crate::error::Error::VaultLocked) before any
//! storage access. This gate is the single access-control point for all
//! plaintext data in the system.
//!
//! Encryption and decryption happen synchronously at this boundary; the
//! key guard is taken per record and dropped before any storage await.

mod entries;
mod stories;

pub use entries::EntryRepository;
pub use stories::StoryRepository;
