//! Input validation for values written by the insert operations.
//!
//! SQLite does not enforce `VARCHAR(n)` bounds, so string values are checked
//! against the declared column lengths before they reach the store.

use std::fmt;

use crate::schema::Table;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a value against the declared length of `table.column`.
///
/// Columns without a declared length accept anything.
pub fn validate_column_length(
    table: &Table,
    column: &str,
    value: &str,
) -> Result<(), ValidationError> {
    let Some(max) = table.column(column).and_then(|c| c.max_len()) else {
        return Ok(());
    };

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: format!("{}.{}", table.name, column),
            max,
            actual,
        });
    }

    Ok(())
}
