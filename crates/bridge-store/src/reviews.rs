//! Review log — append-only history of completed reviews.
//!
//! ```sql
//! CREATE TABLE reviews (
//!     id            INTEGER PRIMARY KEY AUTOINCREMENT,
//!     session_id    TEXT NOT NULL,
//!     type          TEXT NOT NULL,
//!     verdict       TEXT NOT NULL,
//!     summary       TEXT NOT NULL,
//!     findings_json TEXT NOT NULL,
//!     timestamp     TEXT NOT NULL
//! )
//! ```
//!
//! Entries are never deleted by the bridge.

use bridge_core::types::ReviewKind;
use chrono::Utc;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::connection::ConnectionPool;
use crate::errors::Result;

/// A review about to be appended.
#[derive(Clone, Debug)]
pub struct NewReview {
    pub session_id: String,
    pub kind: ReviewKind,
    /// Verdict string as surfaced to the caller (`approve`, `blocked`, …).
    pub verdict: String,
    pub summary: String,
    /// Findings (or blockers/warnings) as the JSON actually returned.
    pub findings_json: String,
}

/// A stored review row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: i64,
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub verdict: String,
    pub summary: String,
    pub findings_json: String,
    pub timestamp: String,
}

/// Pool-backed review log. Cheap to clone.
#[derive(Clone)]
pub struct ReviewLog {
    pool: ConnectionPool,
}

impl ReviewLog {
    pub(crate) fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub(crate) fn init_schema(&self) -> Result<()> {
        let conn = self.pool.get()?;
        let _ = conn.execute(
            "CREATE TABLE IF NOT EXISTS reviews (
                 id            INTEGER PRIMARY KEY AUTOINCREMENT,
                 session_id    TEXT NOT NULL,
                 type          TEXT NOT NULL,
                 verdict       TEXT NOT NULL,
                 summary       TEXT NOT NULL,
                 findings_json TEXT NOT NULL,
                 timestamp     TEXT NOT NULL
             )",
            [],
        )?;
        Ok(())
    }

    /// Append one entry.
    pub fn save(&self, entry: &NewReview) -> Result<()> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO reviews (session_id, type, verdict, summary, findings_json, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.session_id,
                entry.kind.as_str(),
                entry.verdict,
                entry.summary,
                entry.findings_json,
                now
            ],
        )?;
        Ok(())
    }

    /// All entries for a session, oldest first. Unknown session → empty.
    pub fn by_session(&self, session_id: &str) -> Result<Vec<ReviewRecord>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, type, verdict, summary, findings_json, timestamp
             FROM reviews WHERE session_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![session_id], row_to_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// The most recent `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Result<Vec<ReviewRecord>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, type, verdict, summary, findings_json, timestamp
             FROM reviews ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![n as i64], row_to_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> std::result::Result<ReviewRecord, rusqlite::Error> {
    Ok(ReviewRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        kind: row.get(2)?,
        verdict: row.get(3)?,
        summary: row.get(4)?,
        findings_json: row.get(5)?,
        timestamp: row.get(6)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{open_pool, MEMORY_PATH};

    fn log() -> ReviewLog {
        let log = ReviewLog::new(open_pool(MEMORY_PATH).unwrap());
        log.init_schema().unwrap();
        log
    }

    fn entry(session: &str, verdict: &str) -> NewReview {
        NewReview {
            session_id: session.to_owned(),
            kind: ReviewKind::Plan,
            verdict: verdict.to_owned(),
            summary: "a summary".to_owned(),
            findings_json: "[]".to_owned(),
        }
    }

    #[test]
    fn save_and_read_back_by_session() {
        let log = log();
        log.save(&entry("s1", "approve")).unwrap();
        log.save(&entry("s1", "revise")).unwrap();
        log.save(&entry("s2", "approve")).unwrap();

        let records = log.by_session("s1").unwrap();
        assert_eq!(records.len(), 2);
        // ascending id order
        assert!(records[0].id < records[1].id);
        assert_eq!(records[0].verdict, "approve");
        assert_eq!(records[1].verdict, "revise");
    }

    #[test]
    fn unknown_session_is_empty_not_error() {
        let log = log();
        assert!(log.by_session("nobody").unwrap().is_empty());
    }

    #[test]
    fn recent_returns_newest_first_with_limit() {
        let log = log();
        for i in 0..5 {
            log.save(&entry("s1", &format!("v{i}"))).unwrap();
        }
        let records = log.recent(3).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].verdict, "v4");
        assert_eq!(records[2].verdict, "v2");
    }

    #[test]
    fn recent_with_fewer_rows_than_limit() {
        let log = log();
        log.save(&entry("s1", "approve")).unwrap();
        assert_eq!(log.recent(10).unwrap().len(), 1);
    }

    #[test]
    fn kind_stored_as_wire_string() {
        let log = log();
        let mut e = entry("s1", "blocked");
        e.kind = ReviewKind::Precommit;
        log.save(&e).unwrap();
        assert_eq!(log.by_session("s1").unwrap()[0].kind, "precommit");
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let log = log();
        log.save(&entry("s1", "approve")).unwrap();
        let record = &log.by_session("s1").unwrap()[0];
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }
}
