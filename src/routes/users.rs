use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::BearerToken;
use crate::domain::types::UserId;
use crate::forms::auth::{RegisterForm, RegisterFormPayload};
use crate::forms::query::{UserListParams, UserListPayload};
use crate::forms::users::{UpdateUserForm, UpdateUserFormPayload};
use crate::repository::DieselRepository;
use crate::routes::identity;
use crate::services::ServiceError;
use crate::services::users::{
    create_user as create_user_service, delete_user as delete_user_service,
    get_user as get_user_service, list_users as list_users_service,
    update_user as update_user_service,
};

#[get("/users")]
pub async fn list_users(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<UserListParams>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let payload: UserListPayload = params.try_into()?;
    let users = list_users_service(payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/search/users")]
pub async fn search_users(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<UserListParams>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let payload: UserListPayload = params.try_into()?;
    if payload.search.is_none() {
        return Err(ServiceError::Form("Search query is required".to_string()));
    }
    let users = list_users_service(payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(users))
}

#[post("/users")]
pub async fn create_user(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<RegisterForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let payload: RegisterFormPayload = form.try_into()?;
    let user = create_user_service(payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Created().json(user))
}

#[get("/users/{user_id}")]
pub async fn get_user(
    user_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user_id = UserId::new(user_id.into_inner())?;
    let user = get_user_service(user_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/users/{user_id}")]
pub async fn update_user(
    user_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateUserForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user_id = UserId::new(user_id.into_inner())?;
    let payload: UpdateUserFormPayload = form.try_into()?;
    let user = update_user_service(user_id, payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/users/{user_id}")]
pub async fn delete_user(
    user_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user_id = UserId::new(user_id.into_inner())?;
    delete_user_service(user_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::NoContent().finish())
}
