use sqlx::error::DatabaseError;

/// SQLite's primary result code for every constraint failure (unique,
/// foreign key, check, not-null and trigger aborts).
const SQLITE_CONSTRAINT: i32 = 19;

/// Error type for store and repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    /// The session this operation ran in was already committed, rolled back or dropped.
    #[error("Session is closed")]
    SessionClosed,

    #[error("{entity} has not been persisted")]
    NotPersisted { entity: &'static str },

    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(String),

    #[error("Transaction commit failed: {0}")]
    CommitFailed(String),

    #[error("Transaction rollback failed: {0}")]
    RollbackFailed(String),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

/// Result type for store and repository operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if is_constraint_violation(&*db) => {
                StoreError::ConstraintViolation(db.message().to_string())
            }
            err @ (sqlx::Error::PoolClosed
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)) => StoreError::ConnectionFailure(err.to_string()),
            other => StoreError::Database(other),
        }
    }
}

fn is_constraint_violation(db: &dyn DatabaseError) -> bool {
    if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation() {
        return true;
    }
    // Extended result codes carry the primary code in the low byte.
    db.code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| code & 0xff == SQLITE_CONSTRAINT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_are_connection_failures() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::ConnectionFailure(_)));

        let err = StoreError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::ConnectionFailure(_)));
    }

    #[test]
    fn row_not_found_stays_a_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
