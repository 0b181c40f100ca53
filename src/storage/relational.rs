//! Relational storage variant — a single `keys` table in a SQLite database,
//! opened through `rusqlite`.

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

use super::{Backend, BackendId};
use crate::error::StashError;
use crate::record::Document;

/// A location is either a plain filesystem path or a `sqlite://` URI; both
/// resolve to the same file on disk.
fn resolve_path(location: &str) -> String {
    location
        .strip_prefix("sqlite:///")
        .map(|p| format!("/{p}"))
        .or_else(|| location.strip_prefix("sqlite://").map(str::to_string))
        .unwrap_or_else(|| location.to_string())
}

pub struct RelationalStorage {
    conn: Mutex<Connection>,
    location: String,
}

impl RelationalStorage {
    pub fn new(location: &str) -> Result<Self, StashError> {
        let path = resolve_path(location);
        let conn = Connection::open(&path)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("failed to open sqlite connection: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: location.to_string(),
        })
    }

    fn schema_exists(conn: &Connection) -> Result<bool, StashError> {
        conn.query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'keys'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("schema lookup failed: {e}")))
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        Ok(Document {
            name: row.get("name")?,
            value: row.get("value")?,
            description: row.get("description")?,
            metadata: row
                .get::<_, Option<String>>("metadata")?
                .map(|s| serde_json::from_str(&s).unwrap_or_default()),
            uid: row.get("uid")?,
            created_at: row.get("created_at")?,
            modified_at: row.get("modified_at")?,
        })
    }
}

impl Backend for RelationalStorage {
    fn init(&self) -> Result<(), StashError> {
        let conn = self.conn.lock().unwrap();
        if Self::schema_exists(&conn)? {
            return Err(StashError::AlreadyInitialized(self.location.clone()));
        }
        conn.execute(
            "CREATE TABLE keys (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                description TEXT,
                metadata TEXT,
                uid TEXT NOT NULL,
                created_at TEXT NOT NULL,
                modified_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("failed to create schema: {e}")))?;
        Ok(())
    }

    fn put(&self, doc: &Document) -> Result<BackendId, StashError> {
        let conn = self.conn.lock().unwrap();
        let metadata_json = doc
            .metadata
            .as_ref()
            .map(|m| serde_json::to_string(m).unwrap_or_default());

        conn.execute(
            "INSERT INTO keys (name, value, description, metadata, uid, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                description = excluded.description,
                metadata = excluded.metadata,
                modified_at = excluded.modified_at",
            params![
                doc.name,
                doc.value,
                doc.description,
                metadata_json,
                doc.uid,
                doc.created_at,
                doc.modified_at,
            ],
        )
        .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("insert failed: {e}")))?;

        let rowid: i64 = conn
            .query_row("SELECT rowid FROM keys WHERE name = ?1", params![doc.name], |row| row.get(0))
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("failed to read back rowid: {e}")))?;
        Ok(rowid.to_string())
    }

    fn get(&self, name: &str) -> Result<Option<Document>, StashError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT name, value, description, metadata, uid, created_at, modified_at
             FROM keys WHERE name = ?1",
            params![name],
            Self::row_to_document,
        )
        .optional()
        .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("query failed: {e}")))
    }

    fn list(&self) -> Result<Vec<Document>, StashError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT name, value, description, metadata, uid, created_at, modified_at
                 FROM keys ORDER BY rowid ASC",
            )
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("prepare failed: {e}")))?;

        let rows = stmt
            .query_map([], Self::row_to_document)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("query failed: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("row decode failed: {e}")))
    }

    fn delete(&self, name: &str) -> Result<bool, StashError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute("DELETE FROM keys WHERE name = ?1", params![name])
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("delete failed: {e}")))?;
        Ok(affected > 0)
    }
}
