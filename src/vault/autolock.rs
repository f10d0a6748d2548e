//! # Auto-Lock
//!
//! Locks the vault after the app has been backgrounded past a timeout.
//!
//! The platform layer owns the actual lifecycle events (pause/resume,
//! process suspension); this type only tracks when the app went to the
//! background and decides, on return, whether enough time passed to call
//! the session's single `lock()` entry point. Keeping the timing here and
//! the meaning of locking in [`VaultSession`] keeps both halves testable.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use super::VaultSession;

/// Default background grace period before the vault locks
pub const DEFAULT_AUTOLOCK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Background-timeout lock driver
pub struct AutoLock {
    timeout: Duration,
    backgrounded_at: Mutex<Option<Instant>>,
}

impl AutoLock {
    /// Create a driver with an explicit timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            backgrounded_at: Mutex::new(None),
        }
    }

    /// Record that the app just moved to the background
    pub fn note_background(&self) {
        *self.backgrounded_at.lock() = Some(Instant::now());
    }

    /// Record that the app returned to the foreground
    ///
    /// Locks the session if the background stay exceeded the timeout.
    /// Returns whether a lock happened, so the caller can route to the
    /// unlock screen.
    pub fn note_foreground(&self, session: &VaultSession) -> bool {
        let elapsed = self.backgrounded_at.lock().take().map(|at| at.elapsed());

        match elapsed {
            Some(elapsed) if elapsed >= self.timeout => {
                tracing::info!("auto-locking vault after {:?} in background", elapsed);
                session.lock();
                true
            }
            _ => false,
        }
    }
}

impl Default for AutoLock {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOLOCK_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::UserPreferences;
    use crate::storage::{PreferenceStore, SqliteStorage};
    use std::sync::Arc;

    async fn unlocked_session() -> VaultSession {
        let store = Arc::new(SqliteStorage::open(None).await.unwrap());
        let mut prefs = UserPreferences::default();
        prefs.encryption.iterations = 1_000;
        store.save(&prefs).await.unwrap();

        let session = VaultSession::load(store).await.unwrap();
        session.setup("correct-horse-battery").await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_expired_background_locks_on_foreground() {
        let session = unlocked_session().await;
        let autolock = AutoLock::new(Duration::ZERO);

        autolock.note_background();
        let locked = autolock.note_foreground(&session);

        assert!(locked);
        assert!(!session.is_unlocked());
    }

    #[tokio::test]
    async fn test_short_background_keeps_vault_unlocked() {
        let session = unlocked_session().await;
        let autolock = AutoLock::new(Duration::from_secs(3600));

        autolock.note_background();
        let locked = autolock.note_foreground(&session);

        assert!(!locked);
        assert!(session.is_unlocked());
    }

    #[tokio::test]
    async fn test_foreground_without_background_is_noop() {
        let session = unlocked_session().await;
        let autolock = AutoLock::new(Duration::ZERO);

        assert!(!autolock.note_foreground(&session));
        assert!(session.is_unlocked());
    }
}
