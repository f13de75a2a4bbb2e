use actix_web::{HttpResponse, delete, get, post, web};

use crate::auth::BearerToken;
use crate::domain::social::FavoriteOutcome;
use crate::domain::types::{PostId, UserId};
use crate::dto::auth::MessageDto;
use crate::forms::query::PageParams;
use crate::pagination::Pagination;
use crate::repository::DieselRepository;
use crate::routes::identity;
use crate::services::ServiceError;
use crate::services::social::{
    add_favorite as add_favorite_service, favorite_status as favorite_status_service,
    follow_user as follow_user_service, list_followers as list_followers_service,
    list_following as list_following_service, my_favorites as my_favorites_service,
    remove_favorite as remove_favorite_service, unfollow_user as unfollow_user_service,
};

#[post("/posts/{post_id}/favorite")]
pub async fn add_favorite(
    post_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let post_id = PostId::new(post_id.into_inner())?;
    let response = match add_favorite_service(post_id, &identity, repo.get_ref())? {
        FavoriteOutcome::Added => {
            HttpResponse::Created().json(MessageDto::new("Post added to favorites"))
        }
        FavoriteOutcome::AlreadyFavorited => {
            HttpResponse::Ok().json(MessageDto::new("Post already in favorites"))
        }
    };
    Ok(response)
}

#[delete("/posts/{post_id}/favorite")]
pub async fn remove_favorite(
    post_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let post_id = PostId::new(post_id.into_inner())?;
    remove_favorite_service(post_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/posts/{post_id}/favorite/status")]
pub async fn favorite_status(
    post_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let post_id = PostId::new(post_id.into_inner())?;
    let status = favorite_status_service(post_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(status))
}

#[get("/me/favorites")]
pub async fn my_favorites(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let pagination: Pagination = params.try_into()?;
    let posts = my_favorites_service(pagination, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(posts))
}

#[post("/users/{user_id}/follow")]
pub async fn follow_user(
    user_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user_id = UserId::new(user_id.into_inner())?;
    let message = follow_user_service(user_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::Created().json(message))
}

#[delete("/users/{user_id}/follow")]
pub async fn unfollow_user(
    user_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user_id = UserId::new(user_id.into_inner())?;
    unfollow_user_service(user_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/users/{user_id}/following")]
pub async fn list_following(
    user_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user_id = UserId::new(user_id.into_inner())?;
    let users = list_following_service(user_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/users/{user_id}/followers")]
pub async fn list_followers(
    user_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user_id = UserId::new(user_id.into_inner())?;
    let users = list_followers_service(user_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(users))
}
