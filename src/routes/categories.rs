use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::BearerToken;
use crate::domain::category::CategoryUpdate;
use crate::domain::types::CategoryId;
use crate::forms::categories::{AddCategoryForm, AddCategoryFormPayload, UpdateCategoryForm};
use crate::forms::query::{CategoryListParams, CategoryListPayload};
use crate::repository::DieselRepository;
use crate::routes::identity;
use crate::services::ServiceError;
use crate::services::categories::{
    add_category as add_category_service, delete_category as delete_category_service,
    show_categories as show_categories_service, show_category as show_category_service,
    update_category as update_category_service,
};

#[get("/categories")]
pub async fn show_categories(
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<CategoryListParams>,
) -> Result<HttpResponse, ServiceError> {
    let payload: CategoryListPayload = params.try_into()?;
    let categories = show_categories_service(payload, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/categories/{category_id}")]
pub async fn show_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let category_id = CategoryId::new(category_id.into_inner())?;
    let category = show_category_service(category_id, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(category))
}

#[post("/categories")]
pub async fn add_category(
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AddCategoryForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let payload: AddCategoryFormPayload = form.try_into()?;
    let category = add_category_service(payload, &identity, repo.get_ref())?;
    Ok(HttpResponse::Created().json(category))
}

#[put("/categories/{category_id}")]
pub async fn update_category(
    category_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateCategoryForm>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let category_id = CategoryId::new(category_id.into_inner())?;
    let update: CategoryUpdate = form.try_into()?;
    let category = update_category_service(category_id, update, &identity, repo.get_ref())?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/categories/{category_id}")]
pub async fn delete_category(
    category_id: web::Path<i32>,
    token: BearerToken,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let identity = identity(&token, &repo)?;
    let category_id = CategoryId::new(category_id.into_inner())?;
    delete_category_service(category_id, &identity, repo.get_ref())?;
    Ok(HttpResponse::NoContent().finish())
}
