use crate::domain::auth::Identity;
use crate::domain::types::UserId;
use crate::domain::user::UserUpdate;
use crate::dto::users::{UserDto, UserWithStatsDto};
use crate::forms::auth::RegisterFormPayload;
use crate::forms::query::UserListPayload;
use crate::forms::users::UpdateUserFormPayload;
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::access::{require_active, require_admin, require_owner_or_admin};
use crate::services::auth::{create_account, ensure_unique_identity, hash_or_internal};

use super::{ServiceError, ServiceResult};

fn user_not_found() -> ServiceError {
    ServiceError::NotFound("User not found".to_string())
}

pub fn list_users<R>(
    payload: UserListPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<Vec<UserDto>>
where
    R: UserReader,
{
    require_active(identity)?;

    let query = UserListQuery {
        search: payload.search,
        is_active: payload.is_active,
        pagination: Some(payload.pagination),
    };

    match repo.list_users(query) {
        Ok((_total, users)) => Ok(users.into_iter().map(UserDto::from).collect()),
        Err(e) => Err(ServiceError::from_repository("list users", e)),
    }
}

/// A user profile with follower, following and post counts.
pub fn get_user<R>(
    user_id: UserId,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<UserWithStatsDto>
where
    R: UserReader,
{
    require_active(identity)?;

    let user = repo
        .get_user_by_id(user_id)
        .map_err(|e| ServiceError::from_repository("load user", e))?
        .ok_or_else(user_not_found)?;
    let stats = repo
        .get_user_stats(user.id)
        .map_err(|e| ServiceError::from_repository("count user stats", e))?;

    Ok(UserWithStatsDto::new(user, stats))
}

/// Admin account creation. Accounts created this way are never admins;
/// promotion goes through [`update_user`].
pub fn create_user<R>(
    payload: RegisterFormPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<UserDto>
where
    R: UserReader + UserWriter,
{
    require_admin(identity)?;
    create_account(payload, false, repo).map(UserDto::from)
}

pub fn update_user<R>(
    user_id: UserId,
    payload: UpdateUserFormPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<UserDto>
where
    R: UserReader + UserWriter,
{
    require_active(identity)?;
    require_owner_or_admin(identity, user_id)?;
    apply_user_update(user_id, payload, identity, repo)
}

/// Shared update path of `PUT /users/{id}` and `PUT /auth/me`.
pub(crate) fn apply_user_update<R>(
    user_id: UserId,
    payload: UpdateUserFormPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<UserDto>
where
    R: UserReader + UserWriter,
{
    let current = repo
        .get_user_by_id(user_id)
        .map_err(|e| ServiceError::from_repository("load user", e))?
        .ok_or_else(user_not_found)?;

    let password_hash = payload
        .password
        .as_deref()
        .map(hash_or_internal)
        .transpose()?;

    let update = UserUpdate {
        email: payload.email,
        login: payload.login,
        password_hash,
        full_name: payload.full_name,
        bio: payload.bio,
        avatar_url: payload.avatar_url,
        is_active: payload.is_active,
        is_admin: payload.is_admin,
    };

    if update.touches_admin_flags() && !identity.is_admin() {
        return Err(ServiceError::not_enough_permissions());
    }

    ensure_unique_identity(
        update.email.as_ref(),
        update.login.as_ref(),
        Some(&current),
        repo,
    )?;

    match repo.update_user(user_id, &update) {
        Ok(user) => Ok(user.into()),
        Err(crate::repository::errors::RepositoryError::NotFound) => Err(user_not_found()),
        Err(e) => Err(ServiceError::from_repository("update user", e)),
    }
}

/// Delete a user together with everything they authored.
pub fn delete_user<R>(user_id: UserId, identity: &Identity, repo: &R) -> ServiceResult<()>
where
    R: UserWriter,
{
    require_admin(identity)?;

    match repo.delete_user(user_id) {
        Ok(true) => {
            log::info!("Deleted user {user_id}");
            Ok(())
        }
        Ok(false) => Err(user_not_found()),
        Err(e) => Err(ServiceError::from_repository("delete user", e)),
    }
}
