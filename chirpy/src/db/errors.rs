//! Storage error types.

use thiserror::Error;

/// Errors raised by repository implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A uniqueness constraint rejected the write
    #[error("Conflicting record: {0}")]
    Conflict(String),

    /// A stored record could not be interpreted
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    /// Column lookup and decode failures mean the row does not match the
    /// model; everything else is a database fault.
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => StoreError::Corrupt(err.to_string()),
            other => StoreError::Database(other),
        }
    }
}

impl StoreError {
    /// Translate unique-violation database errors into [`StoreError::Conflict`]
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(what.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failures_are_corrupt() {
        let missing = StoreError::from(sqlx::Error::ColumnNotFound("email".to_string()));
        assert!(matches!(missing, StoreError::Corrupt(ref msg) if msg.contains("email")));

        let undecodable = StoreError::from(sqlx::Error::ColumnDecode {
            index: "\"created_at\"".to_string(),
            source: "not a timestamp".into(),
        });
        assert!(matches!(undecodable, StoreError::Corrupt(_)));
    }

    #[test]
    fn test_other_errors_stay_database() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Database(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
