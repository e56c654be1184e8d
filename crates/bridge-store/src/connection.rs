//! SQLite connection pooling.
//!
//! `r2d2` with the `r2d2_sqlite` backend. A customizer applies WAL mode and
//! a busy timeout on every new connection so concurrent handlers in the same
//! process serialize without `SQLITE_BUSY` failures. In-memory databases get
//! a single-connection pool — separate connections would each see their own
//! private database.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::warn;

use crate::errors::Result;

/// Path value selecting a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Alias for the pool type used across the crate.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

#[derive(Debug)]
struct PragmaCustomizer;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = 5000;\
             PRAGMA synchronous = NORMAL;",
        )
    }
}

/// Open a pool for `path` (`:memory:` permitted) and verify one connection.
pub fn open_pool(path: &str) -> Result<ConnectionPool> {
    let (manager, size) = if path == MEMORY_PATH {
        (SqliteConnectionManager::memory(), 1)
    } else {
        (SqliteConnectionManager::file(path), 8)
    };
    let pool = Pool::builder()
        .max_size(size)
        .connection_timeout(std::time::Duration::from_secs(5))
        .connection_customizer(Box::new(PragmaCustomizer))
        .build(manager)?;
    // Fail now, not on first use, when the path is unusable.
    let _ = pool.get()?;
    Ok(pool)
}

/// Open a pool for `path`, falling back to in-memory when that fails.
pub fn open_pool_or_memory(path: &str) -> ConnectionPool {
    match open_pool(path) {
        Ok(pool) => pool,
        Err(err) => {
            warn!(path, %err, "cannot open database file, falling back to in-memory store");
            open_pool(MEMORY_PATH).expect("in-memory sqlite pool")
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
