//! Registration, login and the caller's own profile.

use chrono::Utc;

use crate::auth::{TokenKeys, hash_password, verify_password};
use crate::domain::auth::Identity;
use crate::domain::types::{Email, Login, PasswordHash};
use crate::domain::user::{NewUser, User};
use crate::dto::auth::TokenDto;
use crate::dto::users::UserDto;
use crate::forms::auth::{LoginFormPayload, LoginIdentifier, RegisterFormPayload};
use crate::forms::users::UpdateUserFormPayload;
use crate::repository::{UserReader, UserWriter};
use crate::services::access::require_active;
use crate::services::users::apply_user_update;

use super::{ServiceError, ServiceResult};

pub(crate) fn hash_or_internal(password: &str) -> ServiceResult<PasswordHash> {
    hash_password(password).map_err(|e| {
        log::error!("Failed to hash password: {e}");
        ServiceError::Internal
    })
}

/// Reject an email or login already held by an account other than `except`.
pub(crate) fn ensure_unique_identity<R>(
    email: Option<&Email>,
    login: Option<&Login>,
    except: Option<&User>,
    repo: &R,
) -> ServiceResult<()>
where
    R: UserReader,
{
    let taken_by_other = |found: Option<User>| {
        found.is_some_and(|user| except.is_none_or(|current| current.id != user.id))
    };

    if let Some(email) = email {
        let found = repo
            .get_user_by_email(email)
            .map_err(|e| ServiceError::from_repository("look up user by email", e))?;
        if taken_by_other(found) {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }
    }

    if let Some(login) = login {
        let found = repo
            .get_user_by_login(login)
            .map_err(|e| ServiceError::from_repository("look up user by login", e))?;
        if taken_by_other(found) {
            return Err(ServiceError::Conflict("Login already taken".to_string()));
        }
    }

    Ok(())
}

/// Create an account from a registration payload.
///
/// The fast-path check gives a friendly message; the unique indexes still
/// decide concurrent registrations.
pub(crate) fn create_account<R>(
    payload: RegisterFormPayload,
    is_admin: bool,
    repo: &R,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter,
{
    ensure_unique_identity(Some(&payload.email), Some(&payload.login), None, repo)?;

    let now = Utc::now().naive_utc();
    let new_user = NewUser {
        email: payload.email,
        login: payload.login,
        password_hash: hash_or_internal(&payload.password)?,
        full_name: payload.full_name,
        bio: payload.bio,
        avatar_url: payload.avatar_url,
        is_active: true,
        is_admin,
        created_at: now,
        updated_at: now,
    };

    repo.create_user(&new_user)
        .map_err(|e| ServiceError::from_repository("create user", e))
}

pub fn register<R>(payload: RegisterFormPayload, repo: &R) -> ServiceResult<UserDto>
where
    R: UserReader + UserWriter,
{
    let user = create_account(payload, false, repo)?;
    log::info!("Registered user {}", user.id);
    Ok(user.into())
}

/// Exchange credentials for a bearer token.
pub fn login<R>(payload: LoginFormPayload, keys: &TokenKeys, repo: &R) -> ServiceResult<TokenDto>
where
    R: UserReader,
{
    let incorrect = || ServiceError::Unauthenticated("Incorrect username or password".to_string());

    let found = match &payload.identifier {
        LoginIdentifier::Email(email) => repo.get_user_by_email(email),
        LoginIdentifier::Login(login) => repo.get_user_by_login(login),
        LoginIdentifier::Unknown => Ok(None),
    }
    .map_err(|e| ServiceError::from_repository("load user for login", e))?;

    let user = found.ok_or_else(incorrect)?;
    if !verify_password(&payload.password, &user.password_hash) {
        return Err(incorrect());
    }
    if !user.is_active {
        return Err(ServiceError::BadRequest("Inactive user".to_string()));
    }

    let token = keys.issue(user.id, user.is_admin).map_err(|e| {
        log::error!("Failed to issue access token: {e}");
        ServiceError::Internal
    })?;
    Ok(TokenDto::bearer(token))
}

pub fn me<R>(identity: &Identity, repo: &R) -> ServiceResult<UserDto>
where
    R: UserReader,
{
    let current = require_active(identity)?;
    match repo.get_user_by_id(current.id) {
        Ok(Some(user)) => Ok(user.into()),
        Ok(None) => Err(ServiceError::NotFound("User not found".to_string())),
        Err(e) => Err(ServiceError::from_repository("load current user", e)),
    }
}

/// Update the caller's own profile. Administrative flags still require an
/// admin caller.
pub fn update_me<R>(
    payload: UpdateUserFormPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<UserDto>
where
    R: UserReader + UserWriter,
{
    let current = require_active(identity)?;
    apply_user_update(current.id, payload, identity, repo)
}
