use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{AvatarUrl, Email, Login, TypeConstraintError};

/// Registration payload, also used by admins creating accounts.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 50))]
    pub login: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterFormPayload {
    pub email: Email,
    pub login: Login,
    /// Raw password, hashed by the service before storage.
    pub password: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<AvatarUrl>,
}

#[derive(Debug, Error)]
pub enum RegisterFormError {
    #[error("Registration form validation failed: {0}")]
    Validation(String),
    #[error("Registration form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for RegisterFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for RegisterFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<RegisterForm> for RegisterFormPayload {
    type Error = RegisterFormError;

    fn try_from(value: RegisterForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            email: Email::new(value.email)?,
            login: Login::new(value.login)?,
            password: value.password,
            full_name: value.full_name,
            bio: value.bio,
            avatar_url: value.avatar_url.map(AvatarUrl::new).transpose()?,
        })
    }
}

/// Credential exchange. `username` may be either the email or the login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// How a login form identifies the account.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginIdentifier {
    Email(Email),
    Login(Login),
    /// Neither a valid email nor a valid login; can never match an account.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginFormPayload {
    pub identifier: LoginIdentifier,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum LoginFormError {
    #[error("Login form validation failed: {0}")]
    Validation(String),
}

impl From<ValidationErrors> for LoginFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl TryFrom<LoginForm> for LoginFormPayload {
    type Error = LoginFormError;

    fn try_from(value: LoginForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let identifier = if value.username.contains('@') {
            Email::new(value.username)
                .map(LoginIdentifier::Email)
                .unwrap_or(LoginIdentifier::Unknown)
        } else {
            Login::new(value.username)
                .map(LoginIdentifier::Login)
                .unwrap_or(LoginIdentifier::Unknown)
        };

        Ok(Self {
            identifier,
            password: value.password,
        })
    }
}
