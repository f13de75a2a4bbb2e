use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{AvatarUrl, Email, Login, TypeConstraintError};

/// Partial user update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserForm {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub login: Option<String>,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    /// Admin only.
    pub is_active: Option<bool>,
    /// Admin only.
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUserFormPayload {
    pub email: Option<Email>,
    pub login: Option<Login>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<AvatarUrl>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Error)]
pub enum UpdateUserFormError {
    #[error("Update user form validation failed: {0}")]
    Validation(String),
    #[error("Update user form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for UpdateUserFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for UpdateUserFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<UpdateUserForm> for UpdateUserFormPayload {
    type Error = UpdateUserFormError;

    fn try_from(value: UpdateUserForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            email: value.email.map(Email::new).transpose()?,
            login: value.login.map(Login::new).transpose()?,
            full_name: value.full_name,
            bio: value.bio,
            avatar_url: value.avatar_url.map(AvatarUrl::new).transpose()?,
            password: value.password,
            is_active: value.is_active,
            is_admin: value.is_admin,
        })
    }
}
