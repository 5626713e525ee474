use sqlx::Error as SqlxError;
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const QUERY_CANCELED: &str = "57014";
const IDLE_IN_TRANSACTION_TIMEOUT: &str = "25P03";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Transaction timed out")]
    Timeout,

    #[error("Custom: {0}")]
    Custom(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound,
            SqlxError::PoolTimedOut => RepositoryError::Timeout,
            SqlxError::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => RepositoryError::AlreadyExists(message),
                    Some(FOREIGN_KEY_VIOLATION) => RepositoryError::ForeignKey(message),
                    Some(CHECK_VIOLATION) => RepositoryError::Constraint(message),
                    Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
                    | Some(LOCK_NOT_AVAILABLE) => RepositoryError::Conflict(message),
                    Some(QUERY_CANCELED) | Some(IDLE_IN_TRANSACTION_TIMEOUT) => {
                        RepositoryError::Timeout
                    }
                    _ => RepositoryError::Sqlx(err),
                }
            }
            _ => RepositoryError::Sqlx(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = RepositoryError::from(SqlxError::RowNotFound);
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[test]
    fn pool_timeout_maps_to_timeout() {
        let err = RepositoryError::from(SqlxError::PoolTimedOut);
        assert!(matches!(err, RepositoryError::Timeout));
    }
}
