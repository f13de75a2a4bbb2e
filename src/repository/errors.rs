use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    /// A unique or primary key constraint fired on the named field.
    #[error("{0} already exists")]
    Duplicate(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// A stored row could not be converted into a domain value.
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("database error: {0}")]
    DatabaseError(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Extracts the offending column from a SQLite unique violation message,
/// e.g. `UNIQUE constraint failed: users.email` yields `email`.
fn duplicate_field(message: &str) -> String {
    message
        .rsplit(':')
        .next()
        .and_then(|columns| columns.split(',').next())
        .map(str::trim)
        .and_then(|column| column.rsplit('.').next())
        .filter(|column| !column.is_empty())
        .unwrap_or("record")
        .to_string()
}

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Duplicate(duplicate_field(info.message()))
            }
            DieselError::DatabaseError(
                DatabaseErrorKind::CheckViolation | DatabaseErrorKind::ForeignKeyViolation,
                info,
            ) => Self::ConstraintViolation(info.message().to_string()),
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

impl From<PoolError> for RepositoryError {
    fn from(value: PoolError) -> Self {
        Self::ConnectionError(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_column_from_unique_message() {
        assert_eq!(duplicate_field("UNIQUE constraint failed: users.email"), "email");
        assert_eq!(
            duplicate_field("UNIQUE constraint failed: favorites.user_id, favorites.post_id"),
            "user_id"
        );
        assert_eq!(duplicate_field(""), "record");
    }
}
