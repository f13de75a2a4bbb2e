//! Identity resolution and authorization predicates.

use crate::auth::Claims;
use crate::domain::auth::{AuthenticatedUser, Identity};
use crate::domain::types::UserId;
use crate::repository::UserReader;

use super::{ServiceError, ServiceResult};

/// Turn decoded token claims into an [`Identity`].
///
/// No claims means an anonymous caller. Claims naming a user that no longer
/// exists are rejected.
pub fn resolve_identity<R>(claims: Option<&Claims>, repo: &R) -> ServiceResult<Identity>
where
    R: UserReader,
{
    let Some(claims) = claims else {
        return Ok(Identity::Anonymous);
    };

    let invalid = || ServiceError::Unauthenticated("Could not validate credentials".to_string());
    let user_id = claims.user_id().ok_or_else(invalid)?;

    match repo.get_user_by_id(user_id) {
        Ok(Some(user)) => Ok(Identity::Authenticated(AuthenticatedUser::from(&user))),
        Ok(None) => Err(invalid()),
        Err(e) => {
            log::error!("Failed to resolve token user: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn require_authenticated(identity: &Identity) -> ServiceResult<&AuthenticatedUser> {
    identity
        .user()
        .ok_or_else(|| ServiceError::Unauthenticated("Not authenticated".to_string()))
}

/// Authenticated and not deactivated.
pub fn require_active(identity: &Identity) -> ServiceResult<&AuthenticatedUser> {
    let user = require_authenticated(identity)?;
    if !user.is_active {
        return Err(ServiceError::Forbidden("Inactive user".to_string()));
    }
    Ok(user)
}

pub fn require_admin(identity: &Identity) -> ServiceResult<&AuthenticatedUser> {
    let user = require_active(identity)?;
    if !user.is_admin {
        return Err(ServiceError::not_enough_permissions());
    }
    Ok(user)
}

/// The caller owns the resource or is an admin.
pub fn require_owner_or_admin(
    identity: &Identity,
    owner_id: UserId,
) -> ServiceResult<&AuthenticatedUser> {
    let user = require_authenticated(identity)?;
    if !identity.can_manage(owner_id) {
        return Err(ServiceError::not_enough_permissions());
    }
    Ok(user)
}
