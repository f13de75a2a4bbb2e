//! Favorites and the follower graph.

use crate::domain::auth::Identity;
use crate::domain::social::{FavoriteOutcome, FollowOutcome};
use crate::domain::types::{PostId, UserId};
use crate::dto::auth::{FavoriteStatusDto, MessageDto};
use crate::dto::posts::PostDto;
use crate::dto::users::UserDto;
use crate::pagination::Pagination;
use crate::repository::{PostReader, SocialReader, SocialWriter, UserReader};
use crate::services::access::require_active;
use crate::services::posts::load_post;

use super::{ServiceError, ServiceResult};

/// Favorite a published post. Favoriting twice is a no-op reported as
/// [`FavoriteOutcome::AlreadyFavorited`].
pub fn add_favorite<R>(
    post_id: PostId,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<FavoriteOutcome>
where
    R: PostReader + SocialWriter,
{
    let current = require_active(identity)?;

    let post = load_post(post_id, repo)?;
    if !post.post.is_published {
        return Err(ServiceError::Forbidden(
            "Cannot favorite unpublished post".to_string(),
        ));
    }

    repo.add_favorite(current.id, post_id)
        .map_err(|e| ServiceError::from_repository("add favorite", e))
}

pub fn remove_favorite<R>(post_id: PostId, identity: &Identity, repo: &R) -> ServiceResult<()>
where
    R: SocialWriter,
{
    let current = require_active(identity)?;

    match repo.remove_favorite(current.id, post_id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ServiceError::NotFound(
            "Post not found in favorites".to_string(),
        )),
        Err(e) => Err(ServiceError::from_repository("remove favorite", e)),
    }
}

pub fn favorite_status<R>(
    post_id: PostId,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<FavoriteStatusDto>
where
    R: SocialReader,
{
    let current = require_active(identity)?;

    repo.is_favorited(current.id, post_id)
        .map(|is_favorited| FavoriteStatusDto { is_favorited })
        .map_err(|e| ServiceError::from_repository("check favorite", e))
}

pub fn my_favorites<R>(
    pagination: Pagination,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<Vec<PostDto>>
where
    R: SocialReader,
{
    let current = require_active(identity)?;

    match repo.list_favorite_posts(current.id, Some(pagination)) {
        Ok((_total, posts)) => Ok(posts.into_iter().map(PostDto::from).collect()),
        Err(e) => Err(ServiceError::from_repository("list favorites", e)),
    }
}

pub fn follow_user<R>(target_id: UserId, identity: &Identity, repo: &R) -> ServiceResult<MessageDto>
where
    R: UserReader + SocialWriter,
{
    let current = require_active(identity)?;

    let target = repo
        .get_user_by_id(target_id)
        .map_err(|e| ServiceError::from_repository("load user", e))?;
    if target.is_none() {
        return Err(ServiceError::NotFound("User not found".to_string()));
    }

    match repo.follow_user(current.id, target_id) {
        Ok(FollowOutcome::Followed) => Ok(MessageDto::new("User followed successfully")),
        Ok(FollowOutcome::SelfFollow) => {
            Err(ServiceError::BadRequest("Cannot follow yourself".to_string()))
        }
        Ok(FollowOutcome::AlreadyFollowing) => Err(ServiceError::Conflict(
            "Already following this user".to_string(),
        )),
        Err(e) => Err(ServiceError::from_repository("follow user", e)),
    }
}

pub fn unfollow_user<R>(target_id: UserId, identity: &Identity, repo: &R) -> ServiceResult<()>
where
    R: SocialWriter,
{
    let current = require_active(identity)?;

    match repo.unfollow_user(current.id, target_id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ServiceError::NotFound("Not following this user".to_string())),
        Err(e) => Err(ServiceError::from_repository("unfollow user", e)),
    }
}

pub fn list_following<R>(
    user_id: UserId,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<Vec<UserDto>>
where
    R: SocialReader,
{
    require_active(identity)?;

    match repo.list_following(user_id) {
        Ok(users) => Ok(users.into_iter().map(UserDto::from).collect()),
        Err(e) => Err(ServiceError::from_repository("list following", e)),
    }
}

pub fn list_followers<R>(
    user_id: UserId,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<Vec<UserDto>>
where
    R: SocialReader,
{
    require_active(identity)?;

    match repo.list_followers(user_id) {
        Ok(users) => Ok(users.into_iter().map(UserDto::from).collect()),
        Err(e) => Err(ServiceError::from_repository("list followers", e)),
    }
}
