//! Store error type.

use bridge_core::BridgeError;
use thiserror::Error;

/// Infrastructure failure inside the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure (closed handle, constraint violation, …).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool failure.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for BridgeError {
    fn from(err: StoreError) -> Self {
        BridgeError::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::ErrorCode;

    #[test]
    fn converts_to_storage_error() {
        let err: BridgeError = StoreError::Sqlite(rusqlite::Error::InvalidQuery).into();
        assert_eq!(err.code, ErrorCode::StorageError);
    }
}
