use std::time::Duration;
use thiserror::Error as ThisError;

use super::IsRetryable;
use super::classify::{ErrorClass, classify};

#[derive(Debug, ThisError)]
pub enum InventoryError {
    /// The store aborted the transaction to keep a serial order; safe to re-run.
    #[error("Serialization conflict: {0}")]
    SerializationConflict(String),

    #[error("Insufficient quantity for product {id}: requested {requested}, available {available}")]
    InsufficientQuantity {
        id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Product {0} not found")]
    NotFound(i64),

    #[error("Product {0} already exists")]
    DuplicateKey(i64),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error("Gave up after {attempts} attempt(s): {last}")]
    RetryExhausted {
        attempts: usize,
        #[source]
        last: Box<InventoryError>,
    },

    #[error("Deadline of {0:?} elapsed")]
    DeadlineElapsed(Duration),

    #[error("Unsupported database url: {0}")]
    UnsupportedDatabase(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InventoryError {
    /// Errors after which an interactive session cannot sensibly continue: the connection to
    /// the store is gone or local I/O broke. Statement-level store errors are not fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            InventoryError::Database(err) => matches!(
                err,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::Protocol(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            InventoryError::Io(_) => true,
            _ => false,
        }
    }
}

/// Classifies driver errors so that conflicts surface as the retryable variant.
impl From<sqlx::Error> for InventoryError {
    fn from(err: sqlx::Error) -> Self {
        match classify(&err) {
            ErrorClass::SerializationConflict => {
                let message = match &err {
                    sqlx::Error::Database(db_err) => db_err.message().to_string(),
                    other => other.to_string(),
                };
                InventoryError::SerializationConflict(message)
            }
            ErrorClass::ConstraintViolation | ErrorClass::Other => InventoryError::Database(err),
        }
    }
}

impl From<figment::Error> for InventoryError {
    fn from(err: figment::Error) -> Self {
        InventoryError::Config(Box::new(err))
    }
}

impl IsRetryable for InventoryError {
    fn is_retryable(&self) -> bool {
        matches!(self, InventoryError::SerializationConflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(InventoryError::SerializationConflict("restart transaction".into()).is_retryable());
        assert!(
            !InventoryError::InsufficientQuantity {
                id: 1,
                requested: 5,
                available: 2,
            }
            .is_retryable()
        );
        assert!(!InventoryError::NotFound(3).is_retryable());
        assert!(!InventoryError::DuplicateKey(3).is_retryable());
        assert!(!InventoryError::Database(sqlx::Error::PoolTimedOut).is_retryable());
    }

    #[test]
    fn exhausted_error_keeps_last_conflict_as_source() {
        let err = InventoryError::RetryExhausted {
            attempts: 3,
            last: Box::new(InventoryError::SerializationConflict("abort".into())),
        };

        assert!(!err.is_retryable());
        let source = std::error::Error::source(&err).expect("source present");
        assert_eq!(source.to_string(), "Serialization conflict: abort");
        assert_eq!(
            err.to_string(),
            "Gave up after 3 attempt(s): Serialization conflict: abort"
        );
    }

    #[test]
    fn transport_errors_are_fatal_domain_errors_are_not() {
        assert!(InventoryError::Database(sqlx::Error::PoolClosed).is_fatal());
        assert!(InventoryError::Database(sqlx::Error::PoolTimedOut).is_fatal());
        assert!(
            InventoryError::Database(sqlx::Error::Io(std::io::Error::from(
                std::io::ErrorKind::ConnectionReset
            )))
            .is_fatal()
        );
        assert!(!InventoryError::Database(sqlx::Error::RowNotFound).is_fatal());
        assert!(
            !InventoryError::Database(sqlx::Error::Configuration(
                "relation \"store\" does not exist".into()
            ))
            .is_fatal()
        );
        assert!(!InventoryError::NotFound(1).is_fatal());
        assert!(
            !InventoryError::RetryExhausted {
                attempts: 1,
                last: Box::new(InventoryError::DeadlineElapsed(Duration::from_millis(5))),
            }
            .is_fatal()
        );
    }

    #[test]
    fn non_database_sqlx_errors_map_to_database_variant() {
        let err = InventoryError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, InventoryError::Database(_)));
    }
}
