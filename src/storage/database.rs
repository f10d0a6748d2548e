//! # SQLite Storage
//!
//! rusqlite-backed implementation of [`EnvelopeStore`] and
//! [`PreferenceStore`]. The connection is wrapped in a `parking_lot::Mutex`;
//! operations are short and synchronous under the lock, exposed behind
//! async trait methods so callers share one scheduling model with the
//! network-backed capabilities.

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::preferences::UserPreferences;
use crate::time::now_iso;

use super::schema;
use super::{Envelope, EnvelopeKind, EnvelopeStore, Pagination, PreferenceStore};

const ENVELOPE_COLUMNS: &str = "id, type, ciphertext, iv, created_at, updated_at";

/// SQLite-backed storage
///
/// Open with a file path for production, or `None` for an in-memory
/// database (useful for testing).
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open or create a database
    pub async fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| Error::DatabaseFailed(format!("failed to open database: {}", e)))?,
            None => Connection::open_in_memory().map_err(|e| {
                Error::DatabaseFailed(format!("failed to create in-memory database: {}", e))
            })?,
        };

        let storage = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .ok();

        match version {
            None => {
                conn.execute_batch(schema::CREATE_TABLES)
                    .map_err(|e| Error::DatabaseFailed(format!("failed to create tables: {}", e)))?;
                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![schema::SCHEMA_VERSION],
                )
                .map_err(|e| {
                    Error::DatabaseFailed(format!("failed to set schema version: {}", e))
                })?;

                tracing::info!("database schema created (version {})", schema::SCHEMA_VERSION);
            }
            Some(v) => {
                tracing::debug!("database schema version: {}", v);
            }
        }

        Ok(())
    }
}

fn map_envelope(row: &rusqlite::Row<'_>) -> rusqlite::Result<Envelope> {
    let kind_str: String = row.get(1)?;
    let kind = EnvelopeKind::from_str(&kind_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Envelope {
        id: row.get(0)?,
        kind,
        ciphertext_base64: row.get(2)?,
        iv_base64: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[async_trait]
impl EnvelopeStore for SqliteStorage {
    async fn put(&self, envelope: &Envelope) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO envelopes (id, type, ciphertext, iv, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                envelope.id,
                envelope.kind.as_str(),
                envelope.ciphertext_base64,
                envelope.iv_base64,
                envelope.created_at,
                envelope.updated_at,
            ],
        )
        .map_err(|e| Error::DatabaseFailed(format!("failed to store envelope: {}", e)))?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Envelope>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            &format!("SELECT {} FROM envelopes WHERE id = ?", ENVELOPE_COLUMNS),
            params![id],
            map_envelope,
        );

        match result {
            Ok(envelope) => Ok(Some(envelope)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseFailed(format!(
                "failed to get envelope: {}",
                e
            ))),
        }
    }

    async fn list_by_kind(&self, kind: EnvelopeKind, page: Pagination) -> Result<Vec<Envelope>> {
        let conn = self.conn.lock();

        // SQLite treats LIMIT -1 as "no limit"
        let limit: i64 = if page.limit == u64::MAX {
            -1
        } else {
            page.limit.min(i64::MAX as u64) as i64
        };
        let offset: i64 = page.offset.min(i64::MAX as u64) as i64;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM envelopes WHERE type = ?
                 ORDER BY updated_at DESC LIMIT ? OFFSET ?",
                ENVELOPE_COLUMNS
            ))
            .map_err(|e| Error::DatabaseFailed(format!("failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![kind.as_str(), limit, offset], map_envelope)
            .map_err(|e| Error::DatabaseFailed(format!("failed to query envelopes: {}", e)))?;

        let mut envelopes = Vec::new();
        for row in rows {
            envelopes.push(
                row.map_err(|e| Error::DatabaseFailed(format!("failed to read envelope: {}", e)))?,
            );
        }

        Ok(envelopes)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM envelopes WHERE id = ?", params![id])
            .map_err(|e| Error::DatabaseFailed(format!("failed to delete envelope: {}", e)))?;

        Ok(rows > 0)
    }

    async fn count(&self, kind: EnvelopeKind) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM envelopes WHERE type = ?",
                params![kind.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| Error::DatabaseFailed(format!("failed to count envelopes: {}", e)))?;

        Ok(count as u64)
    }

    async fn export_all(&self) -> Result<Vec<Envelope>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM envelopes ORDER BY updated_at DESC",
                ENVELOPE_COLUMNS
            ))
            .map_err(|e| Error::DatabaseFailed(format!("failed to prepare export: {}", e)))?;

        let rows = stmt
            .query_map([], map_envelope)
            .map_err(|e| Error::DatabaseFailed(format!("failed to export envelopes: {}", e)))?;

        let mut envelopes = Vec::new();
        for row in rows {
            envelopes.push(
                row.map_err(|e| Error::DatabaseFailed(format!("failed to read envelope: {}", e)))?,
            );
        }

        Ok(envelopes)
    }

    async fn import_all(&self, envelopes: &[Envelope]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::DatabaseFailed(format!("failed to open transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO envelopes (id, type, ciphertext, iv, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .map_err(|e| Error::DatabaseFailed(format!("failed to prepare import: {}", e)))?;

            for envelope in envelopes {
                stmt.execute(params![
                    envelope.id,
                    envelope.kind.as_str(),
                    envelope.ciphertext_base64,
                    envelope.iv_base64,
                    envelope.created_at,
                    envelope.updated_at,
                ])
                .map_err(|e| Error::DatabaseFailed(format!("failed to import envelope: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| Error::DatabaseFailed(format!("failed to commit import: {}", e)))?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM envelopes", [])
            .map_err(|e| Error::DatabaseFailed(format!("failed to clear envelopes: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for SqliteStorage {
    async fn load(&self) -> Result<Option<UserPreferences>> {
        let conn = self.conn.lock();

        let result: rusqlite::Result<String> = conn.query_row(
            "SELECT value FROM preferences WHERE id = 1",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseFailed(format!(
                "failed to load preferences: {}",
                e
            ))),
        }
    }

    async fn save(&self, preferences: &UserPreferences) -> Result<()> {
        let json = serde_json::to_string(preferences)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO preferences (id, value, updated_at) VALUES (1, ?, ?)",
            params![json, now_iso()],
        )
        .map_err(|e| Error::DatabaseFailed(format!("failed to save preferences: {}", e)))?;

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Theme;

    fn envelope(id: &str, kind: EnvelopeKind, updated_at: &str) -> Envelope {
        Envelope {
            id: id.into(),
            kind,
            ciphertext_base64: "Y2lwaGVydGV4dA==".into(),
            iv_base64: "aXZpdml2aXZpdg==".into(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
            updated_at: updated_at.into(),
        }
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = SqliteStorage::open(None).await.unwrap();
        let original = envelope("e1", EnvelopeKind::Entry, "2024-01-02T00:00:00.000Z");

        store.put(&original).await.unwrap();
        let loaded = store.get("e1").await.unwrap().unwrap();

        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_get_unknown_id_returns_none() {
        let store = SqliteStorage::open(None).await.unwrap();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_by_id() {
        let store = SqliteStorage::open(None).await.unwrap();
        store
            .put(&envelope("e1", EnvelopeKind::Entry, "2024-01-02T00:00:00.000Z"))
            .await
            .unwrap();

        let mut newer = envelope("e1", EnvelopeKind::Entry, "2024-01-03T00:00:00.000Z");
        newer.ciphertext_base64 = "bmV3ZXI=".into();
        store.put(&newer).await.unwrap();

        assert_eq!(store.count(EnvelopeKind::Entry).await.unwrap(), 1);
        assert_eq!(store.get("e1").await.unwrap().unwrap(), newer);
    }

    #[tokio::test]
    async fn test_list_by_kind_filters_and_orders_descending() {
        let store = SqliteStorage::open(None).await.unwrap();
        store
            .put(&envelope("a", EnvelopeKind::Entry, "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        store
            .put(&envelope("b", EnvelopeKind::Entry, "2024-01-03T00:00:00.000Z"))
            .await
            .unwrap();
        store
            .put(&envelope("c", EnvelopeKind::Entry, "2024-01-02T00:00:00.000Z"))
            .await
            .unwrap();
        store
            .put(&envelope("s", EnvelopeKind::Story, "2024-01-04T00:00:00.000Z"))
            .await
            .unwrap();

        let listed = store
            .list_by_kind(EnvelopeKind::Entry, Pagination::default())
            .await
            .unwrap();

        let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_list_by_kind_applies_offset_and_limit() {
        let store = SqliteStorage::open(None).await.unwrap();
        for (id, ts) in [
            ("a", "2024-01-01T00:00:00.000Z"),
            ("b", "2024-01-02T00:00:00.000Z"),
            ("c", "2024-01-03T00:00:00.000Z"),
            ("d", "2024-01-04T00:00:00.000Z"),
        ] {
            store.put(&envelope(id, EnvelopeKind::Entry, ts)).await.unwrap();
        }

        let page = store
            .list_by_kind(EnvelopeKind::Entry, Pagination::new(1, 2))
            .await
            .unwrap();

        let ids: Vec<&str> = page.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = SqliteStorage::open(None).await.unwrap();
        store
            .put(&envelope("e1", EnvelopeKind::Entry, "2024-01-02T00:00:00.000Z"))
            .await
            .unwrap();

        assert!(store.delete("e1").await.unwrap());
        assert!(!store.delete("e1").await.unwrap());
        assert!(store.get("e1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_per_kind() {
        let store = SqliteStorage::open(None).await.unwrap();
        store
            .put(&envelope("a", EnvelopeKind::Entry, "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        store
            .put(&envelope("b", EnvelopeKind::Entry, "2024-01-02T00:00:00.000Z"))
            .await
            .unwrap();
        store
            .put(&envelope("s", EnvelopeKind::Story, "2024-01-03T00:00:00.000Z"))
            .await
            .unwrap();

        assert_eq!(store.count(EnvelopeKind::Entry).await.unwrap(), 2);
        assert_eq!(store.count(EnvelopeKind::Story).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_empties_all_kinds() {
        let store = SqliteStorage::open(None).await.unwrap();
        store
            .put(&envelope("a", EnvelopeKind::Entry, "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        store
            .put(&envelope("s", EnvelopeKind::Story, "2024-01-02T00:00:00.000Z"))
            .await
            .unwrap();

        store.clear().await.unwrap();

        for kind in EnvelopeKind::ALL {
            assert_eq!(store.count(kind).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_import_all_upserts_by_id() {
        let store = SqliteStorage::open(None).await.unwrap();
        store
            .put(&envelope("a", EnvelopeKind::Entry, "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();

        let mut replacement = envelope("a", EnvelopeKind::Entry, "2024-01-05T00:00:00.000Z");
        replacement.ciphertext_base64 = "cmVwbGFjZWQ=".into();
        let incoming = vec![
            replacement.clone(),
            envelope("b", EnvelopeKind::Entry, "2024-01-02T00:00:00.000Z"),
        ];

        store.import_all(&incoming).await.unwrap();

        assert_eq!(store.count(EnvelopeKind::Entry).await.unwrap(), 2);
        assert_eq!(store.get("a").await.unwrap().unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_preferences_round_trip() {
        let store = SqliteStorage::open(None).await.unwrap();
        assert!(store.load().await.unwrap().is_none());

        let mut prefs = UserPreferences::default();
        prefs.theme = Theme::Dark;
        store.save(&prefs).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, prefs);
    }

    #[tokio::test]
    async fn test_on_disk_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journly.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStorage::open(Some(path)).await.unwrap();
            store
                .put(&envelope("e1", EnvelopeKind::Entry, "2024-01-02T00:00:00.000Z"))
                .await
                .unwrap();
        }

        let reopened = SqliteStorage::open(Some(path)).await.unwrap();
        assert!(reopened.get("e1").await.unwrap().is_some());
    }
}
