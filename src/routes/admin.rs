use actix_web::{HttpResponse, get, web};

use crate::auth::BearerToken;
use crate::domain::types::UserId;
use crate::forms::query::{PostListParams, PostListPayload};
use crate::repository::DieselRepository;
use crate::routes::identity;
use crate::services::ServiceError;
use crate::services::admin::{site_stats as site_stats_service, user_posts as user_posts_service};

#[get("/admin/stats")]
pub async fn site_stats(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let stats = site_stats_service(&identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Only `include_unpublished` and the page parameters are honoured.
#[get("/admin/users/{user_id}/posts")]
pub async fn user_posts(
    user_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<PostListParams>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user_id = UserId::new(user_id.into_inner())?;
    let payload: PostListPayload = params.try_into()?;
    let posts = user_posts_service(
        user_id,
        payload.include_unpublished,
        payload.pagination,
        &identity,
        repo.get_ref(),
    )?;
    Ok(HttpResponse::Ok().json(posts))
}
