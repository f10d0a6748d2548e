//! # Transport Seams
//!
//! The two capabilities the sync service consumes: a blob store for the
//! backup object and a credential source for its bearer token. Both are
//! traits so tests (and future backends) can swap implementations.

use async_trait::async_trait;

use crate::error::Result;

use super::SyncPayload;

/// A remote blob store holding at most one backup object
///
/// Only three operations are required: locate the existing backup object,
/// upload (create or update), and download by id. Implementations move
/// ciphertext blobs only; they never see keys or plaintext.
#[async_trait]
pub trait BlobTransport: Send + Sync {
    /// Locate the backup object; `None` when no backup exists yet
    async fn find_backup_object(&self) -> Result<Option<String>>;

    /// Upload the payload, creating the object or replacing the existing one
    async fn upload(&self, payload: &SyncPayload) -> Result<()>;

    /// Download the payload by object id
    async fn download(&self, object_id: &str) -> Result<SyncPayload>;
}

/// Supplies the opaque bearer token for the blob store
///
/// The token comes from an external OAuth flow; this crate treats it as an
/// opaque string. `bearer_token` is a best-effort probe of the stored
/// session by contract: implementations return `None` instead of erroring
/// when no usable token exists (missing, unreadable, or clearly stale).
/// An expired-but-present token is fine to return; the transport surfaces
/// the resulting 401 as a credentials error.
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, or `None` when signed out
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, for tests and short-lived CLI-style use
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token() {
        let provider = StaticToken("ya29.token".into());
        assert_eq!(provider.bearer_token().as_deref(), Some("ya29.token"));
    }
}
