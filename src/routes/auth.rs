use actix_web::{HttpResponse, get, post, put, web};

use crate::auth::{BearerToken, TokenKeys};
use crate::forms::auth::{LoginForm, LoginFormPayload, RegisterForm, RegisterFormPayload};
use crate::forms::users::{UpdateUserForm, UpdateUserFormPayload};
use crate::repository::DieselRepository;
use crate::routes::identity;
use crate::services::ServiceError;
use crate::services::auth::{
    login as login_service, me as me_service, register as register_service,
    update_me as update_me_service,
};

#[post("/auth/register")]
pub async fn register(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<RegisterForm>,
) -> Result<HttpResponse, ServiceError> {
    let payload: RegisterFormPayload = form.try_into()?;
    let user = register_service(payload, repo.get_ref())?;
    Ok(HttpResponse::Created().json(user))
}

#[post("/auth/login")]
pub async fn login(
    repo: web::Data<DieselRepository>,
    keys: web::Data<TokenKeys>,
    web::Json(form): web::Json<LoginForm>,
) -> Result<HttpResponse, ServiceError> {
    let payload: LoginFormPayload = form.try_into()?;
    let token = login_service(payload, keys.get_ref(), repo.get_ref())?;
    Ok(HttpResponse::Ok().json(token))
}

#[get("/auth/me")]
pub async fn me(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let user = me_service(&identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/auth/me")]
pub async fn update_me(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateUserForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let payload: UpdateUserFormPayload = form.try_into()?;
    let user = update_me_service(payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(user))
}
