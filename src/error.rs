//! Error types for the database manager.
//!
//! Driver failures are carried through untouched so callers can inspect the
//! original `sqlx::Error`; the remaining variants cover misuse of the manager.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// A statement was issued while no connection is open.
    #[error("no open connection, call start() first")]
    NotStarted,

    /// Any failure raised by the driver during connect, prepare, bind or execute.
    #[error(transparent)]
    Driver(#[from] sqlx::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The private runtime used to drive the driver could not be created.
    #[error("Failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl DbError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Check whether this is the "not started" programming error.
    pub fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Get the underlying driver error, if any.
    pub fn driver_error(&self) -> Option<&sqlx::Error> {
        match self {
            Self::Driver(err) => Some(err),
            _ => None,
        }
    }

    /// SQLSTATE (or backend-specific code) reported by the database server.
    pub fn sql_state(&self) -> Option<String> {
        match self {
            Self::Driver(sqlx::Error::Database(db_err)) => db_err.code().map(|c| c.to_string()),
            _ => None,
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_started_display() {
        let err = DbError::NotStarted;
        assert!(err.is_not_started());
        assert_eq!(err.to_string(), "no open connection, call start() first");
        assert!(err.driver_error().is_none());
    }

    #[test]
    fn test_driver_error_is_transparent() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
        assert!(matches!(
            err.driver_error(),
            Some(sqlx::Error::RowNotFound)
        ));
        assert!(err.sql_state().is_none());
    }

    #[test]
    fn test_invalid_input_display() {
        let err = DbError::invalid_input("bad key");
        assert_eq!(err.to_string(), "Invalid input: bad key");
        assert!(!err.is_not_started());
    }

    #[test]
    fn test_runtime_error_has_source() {
        let io = std::io::Error::other("no threads");
        let err = DbError::Runtime(io);
        assert!(err.source().is_some());
    }
}
