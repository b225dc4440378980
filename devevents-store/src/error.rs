//! Error types for devevents-store

use devevents_core::ValidationErrors;
use thiserror::Error;

use crate::connection::ConnectError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure inside a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A unique index rejected the write
    #[error("{entity} violates unique constraint '{constraint}'")]
    UniqueViolation {
        entity: &'static str,
        constraint: String,
    },

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// A stored row could not be turned back into a record
    #[error("corrupt {resource} row '{id}': {reason}")]
    Corrupt {
        resource: &'static str,
        id: String,
        reason: String,
    },

    /// In-memory state is unusable after a panic in another task
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Classify an sqlx error raised while writing `entity`.
    pub fn from_write(entity: &'static str, e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return Self::UniqueViolation {
                    entity,
                    constraint: db_err.constraint().unwrap_or("unknown").to_owned(),
                };
            }
        }
        Self::Sqlx(e)
    }
}

/// Error returned by the validated-save pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Missing connection configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connecting to the database failed; retryable
    #[error(transparent)]
    Connection(ConnectError),

    /// The record broke a field or reference rule; nothing was written
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A unique index rejected the write (duplicate slug or booking)
    #[error("{entity} violates unique constraint '{constraint}'")]
    ConstraintViolation {
        entity: &'static str,
        constraint: String,
    },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<ConnectError> for Error {
    fn from(e: ConnectError) -> Self {
        match e {
            ConnectError::Configuration(msg) => Self::Configuration(msg),
            other => Self::Connection(other),
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation { entity, constraint } => {
                Self::ConstraintViolation { entity, constraint }
            }
            StoreError::NotFound { resource, id } => Self::NotFound { resource, id },
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devevents_core::ValidationError;

    #[test]
    fn unique_violation_maps_to_constraint_error() {
        let err: Error = StoreError::UniqueViolation {
            entity: "booking",
            constraint: "uniq_event_email".into(),
        }
        .into();
        assert!(matches!(err, Error::ConstraintViolation { entity: "booking", .. }));
        assert_eq!(
            err.to_string(),
            "booking violates unique constraint 'uniq_event_email'"
        );
    }

    #[test]
    fn configuration_is_split_from_connection() {
        let err: Error = ConnectError::Configuration("DATABASE_URL is not set".into()).into();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn storage_error_chains_to_sqlx_source() {
        use std::error::Error as _;

        let err: Error = StoreError::from(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, Error::Storage(StoreError::Sqlx(_))));

        let store_err = err.source().expect("storage error has a source");
        let sqlx_err = store_err.source().expect("sqlx error is chained");
        assert_eq!(sqlx_err.to_string(), sqlx::Error::RowNotFound.to_string());
    }

    #[test]
    fn validation_message_lists_fields() {
        let errors: ValidationErrors = ValidationError::EmptyList { field: "tags" }.into();
        let err = Error::from(errors);
        assert_eq!(
            err.to_string(),
            "validation failed: tags must contain at least one item"
        );
    }
}
