//! Error types for litorm

use thiserror::Error;

/// Result type alias for litorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// HTTP-style status attached to [`OrmError::NotFound`].
pub const NOT_FOUND_STATUS: u16 = 404;

/// Error types for database operations.
///
/// The builder never fails: malformed input produces malformed SQL, which the
/// database rejects and which surfaces here as a driver error, unmodified.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Postgres execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// MySQL execution error
    #[cfg(feature = "mysql")]
    #[error("Query error: {0}")]
    MySql(#[from] sqlx::Error),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// No row matched a lookup by primary key
    #[error("Not found: {message}")]
    NotFound {
        status: u16,
        code: &'static str,
        message: String,
    },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            status: NOT_FOUND_STATUS,
            code: "not_found",
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP-style status code for the presentation layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { status, .. } => *status,
            Self::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Whether the error means the underlying connection is gone and the
    /// statement may be retried on a fresh one.
    pub fn is_invalid_connection(&self) -> bool {
        match self {
            Self::Query(err) if err.is_closed() => true,
            #[cfg(feature = "mysql")]
            Self::MySql(sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => true,
            other => other.to_string().contains("invalid connection"),
        }
    }
}

impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Backend(e) => Self::Query(e),
            other => Self::Pool(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_status() {
        let err = OrmError::not_found("Item not found");
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Not found: Item not found");
    }

    #[test]
    fn invalid_connection_is_detected_by_message() {
        assert!(OrmError::Connection("driver: invalid connection".into()).is_invalid_connection());
        assert!(!OrmError::Other("syntax error at or near".into()).is_invalid_connection());
    }
}
