//! Database error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SchemaError;
use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// A referenced parent row does not exist
    #[error("{entity} references a missing row: {id}")]
    ForeignKeyViolation { entity: &'static str, id: String },

    /// Rejected input
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid schema declaration
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Malformed CSV input
    #[error("csv error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV header names a column the table does not have
    #[error("table {table} has no column named {column:?}")]
    UnknownColumn { table: &'static str, column: String },

    /// CSV row width does not match its header
    #[error("{table}: line {line} has {actual} fields, header has {expected}")]
    RowWidth {
        table: &'static str,
        line: u64,
        expected: usize,
        actual: usize,
    },
}

impl DatabaseError {
    /// Classify a failed insert, mapping key violations onto typed variants.
    pub(crate) fn from_insert(err: sqlx::Error, entity: &'static str, id: String) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists { entity, id };
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::ForeignKeyViolation { entity, id };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
