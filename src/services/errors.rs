use thiserror::Error;

use crate::repository::errors::RepositoryError;

/// Error type returned by service layer functions.
///
/// Each variant corresponds to one HTTP status; the message is shown to the
/// client as is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// No usable credential was presented.
    #[error("{0}")]
    Unauthenticated(String),
    /// The caller is known but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness violation or duplicate relation.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    /// Request payload failed validation.
    #[error("{0}")]
    Form(String),
    /// A value failed a domain type constraint.
    #[error("{0}")]
    TypeConstraint(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_enough_permissions() -> Self {
        Self::Forbidden("Not enough permissions".to_string())
    }

    /// Classify a repository failure. Anything that is not a recognised
    /// constraint outcome is logged and reported as internal.
    pub fn from_repository(action: &str, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Record not found".to_string()),
            RepositoryError::Duplicate(field) => Self::Conflict(duplicate_message(&field)),
            RepositoryError::ConstraintViolation(message) => {
                log::warn!("Constraint violation while trying to {action}: {message}");
                Self::BadRequest("Request violates a data constraint".to_string())
            }
            e => {
                log::error!("Failed to {action}: {e}");
                Self::Internal
            }
        }
    }
}

fn duplicate_message(field: &str) -> String {
    match field {
        "email" => "Email already registered".to_string(),
        "login" => "Login already taken".to_string(),
        "name" | "slug" => "Category name or slug already exists".to_string(),
        other => format!("{other} already exists"),
    }
}
