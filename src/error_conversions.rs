//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or service error types, so
//! the `From` impls bridging them live here. Only the repository conversion
//! is available with the `data` feature alone.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
mod server {
    use crate::auth::AuthError;
    use crate::domain::types::TypeConstraintError;
    use crate::forms::auth::{LoginFormError, RegisterFormError};
    use crate::forms::categories::CategoryFormError;
    use crate::forms::comments::CommentFormError;
    use crate::forms::posts::PostFormError;
    use crate::forms::query::QueryParamsError;
    use crate::forms::users::UpdateUserFormError;
    use crate::services::ServiceError;

    impl From<TypeConstraintError> for ServiceError {
        fn from(val: TypeConstraintError) -> Self {
            ServiceError::TypeConstraint(val.to_string())
        }
    }

    impl From<AuthError> for ServiceError {
        fn from(val: AuthError) -> Self {
            log::error!("Credential handling failed: {val}");
            ServiceError::Internal
        }
    }

    impl From<RegisterFormError> for ServiceError {
        fn from(val: RegisterFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<LoginFormError> for ServiceError {
        fn from(val: LoginFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<UpdateUserFormError> for ServiceError {
        fn from(val: UpdateUserFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<PostFormError> for ServiceError {
        fn from(val: PostFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<CategoryFormError> for ServiceError {
        fn from(val: CategoryFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<CommentFormError> for ServiceError {
        fn from(val: CommentFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<QueryParamsError> for ServiceError {
        fn from(val: QueryParamsError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }
}
