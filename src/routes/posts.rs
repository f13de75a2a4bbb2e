use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::BearerToken;
use crate::domain::post::PostUpdate;
use crate::domain::types::PostId;
use crate::forms::posts::{CreatePostForm, CreatePostFormPayload, UpdatePostForm};
use crate::forms::query::{PageParams, PostListParams, PostListPayload};
use crate::pagination::Pagination;
use crate::repository::DieselRepository;
use crate::routes::identity;
use crate::services::ServiceError;
use crate::services::posts::{
    create_post as create_post_service, delete_post as delete_post_service, feed as feed_service,
    get_post as get_post_service, get_post_by_slug as get_post_by_slug_service,
    list_posts as list_posts_service, record_view, update_post as update_post_service,
};

/// Count a view on a blocking worker once the response is on its way.
fn spawn_view_increment(post_id: PostId, repo: web::Data<DieselRepository>) {
    actix_web::rt::spawn(async move {
        if let Err(e) = web::block(move || record_view(post_id, repo.get_ref())).await {
            log::error!("Failed to schedule view increment for post {post_id}: {e}");
        }
    });
}

#[get("/posts")]
pub async fn list_posts(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<PostListParams>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let payload: PostListPayload = params.try_into()?;
    let posts = list_posts_service(payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(posts))
}

#[get("/search/posts")]
pub async fn search_posts(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<PostListParams>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let payload: PostListPayload = params.try_into()?;
    if payload.search.is_none() {
        return Err(ServiceError::Form("Search query is required".to_string()));
    }
    let posts = list_posts_service(payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(posts))
}

#[post("/posts")]
pub async fn create_post(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreatePostForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let payload: CreatePostFormPayload = form.try_into()?;
    let post = create_post_service(payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Created().json(post))
}

#[get("/posts/slug/{slug}")]
pub async fn get_post_by_slug(
    slug: web::Path<String>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let post = get_post_by_slug_service(&slug, &identity, repo.get_ref())?;
    let post_id = PostId::new(post.post.id)?;
    spawn_view_increment(post_id, repo);
    Ok(HttpResponse::Ok().json(post))
}

#[get("/posts/{post_id}")]
pub async fn get_post(
    post_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let post_id = PostId::new(post_id.into_inner())?;
    let post = get_post_service(post_id, &identity, repo.get_ref())?;
    spawn_view_increment(post_id, repo);
    Ok(HttpResponse::Ok().json(post))
}

#[put("/posts/{post_id}")]
pub async fn update_post(
    post_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdatePostForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let post_id = PostId::new(post_id.into_inner())?;
    let update: PostUpdate = form.try_into()?;
    let post = update_post_service(post_id, update, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(post))
}

#[delete("/posts/{post_id}")]
pub async fn delete_post(
    post_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let post_id = PostId::new(post_id.into_inner())?;
    delete_post_service(post_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/me/feed")]
pub async fn feed(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let pagination: Pagination = params.try_into()?;
    let posts = feed_service(pagination, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(posts))
}
