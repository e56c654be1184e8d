//! # bridge-store
//!
//! SQLite persistence for review sessions and the append-only review log.
//!
//! Two tables, two append-mostly workloads:
//!
//! - `sessions`: one row per reviewer thread, with an at-most-one-completion
//!   state machine (`in_progress → completed | failed`, reactivatable)
//! - `reviews`: append-only history of completed reviews
//!
//! All mutations are single statements; no multi-statement transactions are
//! needed. Connections come from an `r2d2` pool with WAL-mode pragmas so
//! concurrent handlers in one process serialize safely. Every operation
//! returns a typed [`StoreError`] on infrastructure failure — never panics.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod reviews;
pub mod sessions;

pub use connection::{open_pool, open_pool_or_memory, ConnectionPool, MEMORY_PATH};
pub use errors::StoreError;
pub use reviews::{NewReview, ReviewLog, ReviewRecord};
pub use sessions::{SessionInfo, SessionStatus, SessionStore};

use errors::Result;

/// Handle bundling the two stores over one shared pool.
#[derive(Clone)]
pub struct Store {
    /// Session-state machine.
    pub sessions: SessionStore,
    /// Append-only review history.
    pub reviews: ReviewLog,
}

impl Store {
    /// Open (or create) the database at `path` and initialize the schema.
    ///
    /// `:memory:` is permitted and yields a private in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let pool = open_pool(path)?;
        Self::from_pool(pool)
    }

    /// Open the database at `path`, falling back to an in-memory store
    /// (with a logged warning) when the file store cannot be opened.
    /// The process still starts either way.
    pub fn open_or_memory(path: &str) -> Result<Self> {
        let pool = open_pool_or_memory(path);
        Self::from_pool(pool)
    }

    fn from_pool(pool: ConnectionPool) -> Result<Self> {
        let sessions = SessionStore::new(pool.clone());
        let reviews = ReviewLog::new(pool);
        sessions.init_schema()?;
        reviews.init_schema()?;
        Ok(Self { sessions, reviews })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_memory_store() {
        let store = Store::open(MEMORY_PATH).unwrap();
        let info = store.sessions.get_or_create("s1").unwrap();
        assert_eq!(info.session_id, "s1");
    }

    #[test]
    fn open_or_memory_falls_back_on_bad_path() {
        // A path inside a file (not a directory) cannot be opened.
        let file = tempfile::NamedTempFile::new().unwrap();
        let bad = format!("{}/nested/reviews.db", file.path().display());
        let store = Store::open_or_memory(&bad).unwrap();
        assert!(store.sessions.lookup("missing").unwrap().is_none());
    }
}
