//! Session store — the persisted session-state machine.
//!
//! Schema:
//!
//! ```sql
//! CREATE TABLE sessions (
//!     session_id   TEXT PRIMARY KEY,
//!     status       TEXT NOT NULL DEFAULT 'in_progress',
//!     created_at   TEXT NOT NULL,
//!     completed_at TEXT
//! )
//! ```
//!
//! Invariant: `completed_at` is non-null iff `status != in_progress`, and
//! `created_at <= completed_at` (RFC 3339 strings compare lexicographically).
//! Transitions are monotonic within one request attempt; `activate` resets a
//! finished session back to `in_progress` when the caller explicitly resumes.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::ConnectionPool;
use crate::errors::{Result, StoreError};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a session row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::InProgress,
        }
    }
}

/// One session row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub status: SessionStatus,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 completion timestamp; null while in progress (and on
    /// legacy rows written before the column existed).
    pub completed_at: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// Pool-backed session store. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    pool: ConnectionPool,
}

impl SessionStore {
    pub(crate) fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Idempotently create the table, then best-effort add `completed_at`
    /// for databases written by an earlier schema.
    pub(crate) fn init_schema(&self) -> Result<()> {
        let conn = self.pool.get()?;
        let _ = conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                 session_id   TEXT PRIMARY KEY,
                 status       TEXT NOT NULL DEFAULT 'in_progress',
                 created_at   TEXT NOT NULL,
                 completed_at TEXT
             )",
            [],
        )?;
        // Fails with "duplicate column name" on current-schema databases.
        if let Err(err) = conn.execute("ALTER TABLE sessions ADD COLUMN completed_at TEXT", []) {
            debug!(%err, "completed_at migration skipped");
        }
        Ok(())
    }

    /// Return the existing row for `id`, or insert a fresh `in_progress` row.
    pub fn get_or_create(&self, id: &str) -> Result<SessionInfo> {
        let conn = self.pool.get()?;
        if let Some(info) = Self::lookup_on(&conn, id)? {
            return Ok(info);
        }
        let now = Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO sessions (session_id, status, created_at, completed_at)
             VALUES (?1, 'in_progress', ?2, NULL)
             ON CONFLICT(session_id) DO NOTHING",
            params![id, now],
        )?;
        // Re-read instead of assuming: a concurrent writer may have won the insert.
        Ok(Self::lookup_on(&conn, id)?.unwrap_or(SessionInfo {
            session_id: id.to_owned(),
            status: SessionStatus::InProgress,
            created_at: now,
            completed_at: None,
        }))
    }

    /// Upsert `id` to `in_progress` with `completed_at = NULL`.
    ///
    /// A pre-existing row keeps its `created_at`.
    pub fn activate(&self, id: &str) -> Result<SessionInfo> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO sessions (session_id, status, created_at, completed_at)
             VALUES (?1, 'in_progress', ?2, NULL)
             ON CONFLICT(session_id)
             DO UPDATE SET status = 'in_progress', completed_at = NULL",
            params![id, now],
        )?;
        Self::lookup_on(&conn, id)?.ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Flip `id` to `completed`. Missing id is a no-op.
    pub fn mark_completed(&self, id: &str) -> Result<()> {
        self.finish(id, SessionStatus::Completed)
    }

    /// Flip `id` to `failed`. Missing id is a no-op.
    pub fn mark_failed(&self, id: &str) -> Result<()> {
        self.finish(id, SessionStatus::Failed)
    }

    fn finish(&self, id: &str, status: SessionStatus) -> Result<()> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();
        let _ = conn.execute(
            "UPDATE sessions SET status = ?1, completed_at = ?2 WHERE session_id = ?3",
            params![status.as_str(), now, id],
        )?;
        Ok(())
    }

    /// Fetch a session row, if present.
    pub fn lookup(&self, id: &str) -> Result<Option<SessionInfo>> {
        let conn = self.pool.get()?;
        Self::lookup_on(&conn, id)
    }

    fn lookup_on(conn: &rusqlite::Connection, id: &str) -> Result<Option<SessionInfo>> {
        let info = conn
            .query_row(
                "SELECT session_id, status, created_at, completed_at
                 FROM sessions WHERE session_id = ?1",
                params![id],
                |row| {
                    let status: String = row.get(1)?;
                    Ok(SessionInfo {
                        session_id: row.get(0)?,
                        status: SessionStatus::parse(&status),
                        created_at: row.get(2)?,
                        completed_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{open_pool, MEMORY_PATH};

    fn store() -> SessionStore {
        let store = SessionStore::new(open_pool(MEMORY_PATH).unwrap());
        store.init_schema().unwrap();
        store
    }

    #[test]
    fn get_or_create_inserts_in_progress() {
        let store = store();
        let info = store.get_or_create("s1").unwrap();
        assert_eq!(info.session_id, "s1");
        assert_eq!(info.status, SessionStatus::InProgress);
        assert_eq!(info.completed_at, None);
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let store = store();
        let first = store.get_or_create("s1").unwrap();
        let second = store.get_or_create("s1").unwrap();
        assert_eq!(first.session_id, second.session_id);
        assert_eq!(first.created_at, second.created_at);
    }

    #[test]
    fn mark_completed_sets_timestamp() {
        let store = store();
        let created = store.get_or_create("s1").unwrap();
        store.mark_completed("s1").unwrap();
        let info = store.lookup("s1").unwrap().unwrap();
        assert_eq!(info.status, SessionStatus::Completed);
        let completed = info.completed_at.expect("completed_at set");
        assert!(completed >= created.created_at);
    }

    #[test]
    fn mark_failed_sets_status() {
        let store = store();
        let _ = store.get_or_create("s1").unwrap();
        store.mark_failed("s1").unwrap();
        let info = store.lookup("s1").unwrap().unwrap();
        assert_eq!(info.status, SessionStatus::Failed);
        assert!(info.completed_at.is_some());
    }

    #[test]
    fn finish_on_missing_id_is_noop_ok() {
        let store = store();
        store.mark_completed("ghost").unwrap();
        store.mark_failed("ghost").unwrap();
        assert!(store.lookup("ghost").unwrap().is_none());
    }

    #[test]
    fn activate_resets_completed_session() {
        let store = store();
        let created = store.get_or_create("s1").unwrap();
        store.mark_completed("s1").unwrap();

        let info = store.activate("s1").unwrap();
        assert_eq!(info.status, SessionStatus::InProgress);
        assert_eq!(info.completed_at, None);
        assert_eq!(info.created_at, created.created_at);
    }

    #[test]
    fn activate_creates_missing_session() {
        let store = store();
        let info = store.activate("fresh").unwrap();
        assert_eq!(info.status, SessionStatus::InProgress);
    }

    #[test]
    fn activate_resets_failed_session() {
        let store = store();
        let _ = store.get_or_create("s1").unwrap();
        store.mark_failed("s1").unwrap();
        let info = store.activate("s1").unwrap();
        assert_eq!(info.status, SessionStatus::InProgress);
        assert_eq!(info.completed_at, None);
    }

    #[test]
    fn lookup_missing_returns_none() {
        let store = store();
        assert!(store.lookup("nope").unwrap().is_none());
    }

    #[test]
    fn init_schema_twice_is_idempotent() {
        let store = store();
        store.init_schema().unwrap();
        let _ = store.get_or_create("s1").unwrap();
        store.init_schema().unwrap();
        assert!(store.lookup("s1").unwrap().is_some());
    }

    #[test]
    fn migration_adds_completed_at_to_legacy_table() {
        let pool = open_pool(MEMORY_PATH).unwrap();
        {
            let conn = pool.get().unwrap();
            conn.execute_batch(
                "CREATE TABLE sessions (
                     session_id TEXT PRIMARY KEY,
                     status     TEXT NOT NULL DEFAULT 'in_progress',
                     created_at TEXT NOT NULL
                 );
                 INSERT INTO sessions (session_id, status, created_at)
                 VALUES ('legacy', 'completed', '2024-01-01T00:00:00+00:00');",
            )
            .unwrap();
        }
        let store = SessionStore::new(pool);
        store.init_schema().unwrap();
        let info = store.lookup("legacy").unwrap().unwrap();
        assert_eq!(info.status, SessionStatus::Completed);
        assert_eq!(info.completed_at, None);
    }
}
