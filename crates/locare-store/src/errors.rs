//! Error handling for locare-store
//!
//! Wraps locare-core's LocareError with store-specific helpers.

pub use locare_core::errors::Result;
use locare_core::errors::{ErrorKind, LocareError};

/// Create a store error from rusqlite::Error
///
/// A busy/locked database maps to `StoreUnavailable` (the caller decides
/// whether a retry is safe); everything else is `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> LocareError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked =>
        {
            ErrorKind::StoreUnavailable
        }
        _ => ErrorKind::Persistence,
    };
    LocareError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> LocareError {
    LocareError::new(ErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create an error for a row that cannot be decoded into a record
pub fn row_decode_error(table: &str, reason: impl std::fmt::Display) -> LocareError {
    LocareError::new(ErrorKind::Serialization)
        .with_op("row_decode")
        .with_message(format!("cannot decode {} row: {}", table, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_sqlite_error_is_persistence() {
        let err = from_rusqlite(rusqlite::Error::InvalidQuery);
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_busy_maps_to_store_unavailable() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert_eq!(from_rusqlite(busy).kind(), ErrorKind::StoreUnavailable);
    }
}
