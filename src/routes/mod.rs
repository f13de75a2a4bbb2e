//! HTTP surface: JSON handlers over the service layer.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, ResponseError, error, web};
use serde::Serialize;

use crate::auth::BearerToken;
use crate::domain::auth::Identity;
use crate::repository::DieselRepository;
use crate::services::access::resolve_identity;
use crate::services::{ServiceError, ServiceResult};

pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod health;
pub mod posts;
pub mod social;
pub mod users;

/// Body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Form(_) | ServiceError::TypeConstraint(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            ServiceError::Internal => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let mut builder = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(ErrorBody {
            status: status.as_u16(),
            message: &message,
        })
    }
}

/// Resolve the caller named by an optional bearer token.
pub(crate) fn identity(token: &BearerToken, repo: &DieselRepository) -> ServiceResult<Identity> {
    resolve_identity(token.0.as_ref(), repo)
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    ServiceError::Form(err.to_string()).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    ServiceError::Form(err.to_string()).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> error::Error {
    ServiceError::Form(err.to_string()).into()
}

/// Register every route and the extractor configuration that reports
/// malformed bodies, queries and paths as 422.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(auth::me)
        .service(auth::update_me)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::search_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(posts::list_posts)
        .service(posts::create_post)
        .service(posts::search_posts)
        .service(posts::get_post_by_slug)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::delete_post)
        .service(posts::feed)
        .service(comments::list_post_comments)
        .service(comments::create_comment)
        .service(comments::list_comments)
        .service(comments::update_comment)
        .service(comments::delete_comment)
        .service(categories::show_categories)
        .service(categories::show_category)
        .service(categories::add_category)
        .service(categories::update_category)
        .service(categories::delete_category)
        .service(social::add_favorite)
        .service(social::remove_favorite)
        .service(social::favorite_status)
        .service(social::my_favorites)
        .service(social::follow_user)
        .service(social::unfollow_user)
        .service(social::list_following)
        .service(social::list_followers)
        .service(admin::site_stats)
        .service(admin::user_posts);
}
