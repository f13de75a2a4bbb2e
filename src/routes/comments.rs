use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::BearerToken;
use crate::domain::types::{CommentContent, CommentId, PostId};
use crate::forms::comments::{AddCommentForm, AddCommentFormPayload, UpdateCommentForm};
use crate::forms::query::{CommentListParams, CommentListPayload, PageParams};
use crate::pagination::Pagination;
use crate::repository::DieselRepository;
use crate::routes::identity;
use crate::services::ServiceError;
use crate::services::comments::{
    create_comment as create_comment_service, delete_comment as delete_comment_service,
    list_comments as list_comments_service, list_post_comments as list_post_comments_service,
    update_comment as update_comment_service,
};

#[get("/posts/{post_id}/comments")]
pub async fn list_post_comments(
    post_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let post_id = PostId::new(post_id.into_inner())?;
    let pagination: Pagination = params.try_into()?;
    let comments = list_post_comments_service(post_id, pagination, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(comments))
}

#[post("/posts/{post_id}/comments")]
pub async fn create_comment(
    post_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AddCommentForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let post_id = PostId::new(post_id.into_inner())?;
    let payload: AddCommentFormPayload = form.try_into()?;
    let comment = create_comment_service(post_id, payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Created().json(comment))
}

#[get("/comments")]
pub async fn list_comments(
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<CommentListParams>,
) -> Result<HttpResponse, ServiceError> {
    let payload: CommentListPayload = params.try_into()?;
    let comments = list_comments_service(payload, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(comments))
}

#[put("/comments/{comment_id}")]
pub async fn update_comment(
    comment_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateCommentForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let comment_id = CommentId::new(comment_id.into_inner())?;
    let content: CommentContent = form.try_into()?;
    let comment = update_comment_service(comment_id, content, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(comment))
}

#[delete("/comments/{comment_id}")]
pub async fn delete_comment(
    comment_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let comment_id = CommentId::new(comment_id.into_inner())?;
    delete_comment_service(comment_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::NoContent().finish())
}
