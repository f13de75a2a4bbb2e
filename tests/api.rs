use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use blog_backend::auth::TokenKeys;
use blog_backend::domain::user::UserUpdate;
use blog_backend::repository::{DieselRepository, UserReader, UserWriter};
use blog_backend::routes::configure;
use serde_json::{Value, json};

mod common;

const SECRET: &str = "integration-test-secret";

macro_rules! init_app {
    ($repo:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($repo.clone()))
                .app_data(web::Data::new(TokenKeys::new(SECRET, 30)))
                .configure(configure),
        )
        .await
    };
}

/// Register `$login` with the default password and return a bearer header value.
macro_rules! register_and_login {
    ($app:expr, $login:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "email": format!("{}@example.com", $login),
                "login": $login,
                "password": "password123",
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": $login, "password": "password123" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        format!("Bearer {}", body["access_token"].as_str().unwrap())
    }};
}

#[actix_web::test]
async fn health_reports_ok() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn register_login_and_me() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let token = register_and_login!(app, "john");

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", token.as_str()))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["login"], "john");
    assert!(me.get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "john@example.com",
            "login": "johnny",
            "password": "password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "status": 409, "message": "Email already registered" })
    );

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "john@example.com", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn missing_or_bad_credentials_are_unauthorized() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::get().uri("/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_input_is_unprocessable() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "short@example.com",
            "login": "short",
            "password": "123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get()
        .uri("/posts?page_size=500")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get()
        .uri("/posts?order_by=likes")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn out_of_range_pages_do_not_crash() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::get()
        .uri("/posts?page=1000000000000000000&page_size=20")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get()
        .uri("/posts?page=1000000&page_size=100")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn post_visibility_and_lifecycle() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let john = register_and_login!(app, "john");
    let jane = register_and_login!(app, "jane");

    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", john.as_str()))
        .set_json(json!({ "title": "Draft", "content": "Secret", "is_published": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let draft: Value = test::read_body_json(resp).await;
    let draft_uri = format!("/posts/{}", draft["id"]);

    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", john.as_str()))
        .set_json(json!({ "title": "Hello", "content": "World" }))
        .to_request();
    let published: Value = test::call_and_read_body_json(&app, req).await;
    assert!(published["published_at"].is_string());

    let req = test::TestRequest::get().uri("/posts").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["likes_count"], 0);

    let req = test::TestRequest::get()
        .uri(&draft_uri)
        .insert_header(("Authorization", jane.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&draft_uri)
        .insert_header(("Authorization", john.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&draft_uri)
        .insert_header(("Authorization", jane.as_str()))
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&draft_uri)
        .insert_header(("Authorization", john.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&draft_uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": 404, "message": "Post not found" }));
}

#[actix_web::test]
async fn favorites_and_follows() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let john = register_and_login!(app, "john");
    let jane = register_and_login!(app, "jane");

    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(("Authorization", jane.as_str()))
        .set_json(json!({ "title": "Jane's post", "content": "Hello" }))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let favorite_uri = format!("/posts/{}/favorite", post["id"]);

    let favorite = || {
        test::TestRequest::post()
            .uri(&favorite_uri)
            .insert_header(("Authorization", john.as_str()))
            .to_request()
    };
    assert_eq!(
        test::call_service(&app, favorite()).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(test::call_service(&app, favorite()).await.status(), StatusCode::OK);

    let unfavorite = || {
        test::TestRequest::delete()
            .uri(&favorite_uri)
            .insert_header(("Authorization", john.as_str()))
            .to_request()
    };
    assert_eq!(
        test::call_service(&app, unfavorite()).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        test::call_service(&app, unfavorite()).await.status(),
        StatusCode::NOT_FOUND
    );

    let follow_uri = format!("/users/{}/follow", post["author_id"]);
    let follow = || {
        test::TestRequest::post()
            .uri(&follow_uri)
            .insert_header(("Authorization", john.as_str()))
            .to_request()
    };
    let resp = test::call_service(&app, follow()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "User followed successfully");
    assert_eq!(
        test::call_service(&app, follow()).await.status(),
        StatusCode::CONFLICT
    );

    let req = test::TestRequest::get()
        .uri("/me/feed")
        .insert_header(("Authorization", john.as_str()))
        .to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(feed.as_array().unwrap().len(), 1);
    assert_eq!(feed[0]["title"], "Jane's post");
}

#[actix_web::test]
async fn admin_routes_require_admin() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let john = register_and_login!(app, "john");
    let req = test::TestRequest::get()
        .uri("/admin/stats")
        .insert_header(("Authorization", john.as_str()))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let admin = register_and_login!(app, "admin");
    let admin_login = blog_backend::domain::types::Login::new("admin").unwrap();
    let admin_user = repo.get_user_by_login(&admin_login).unwrap().unwrap();
    repo.update_user(
        admin_user.id,
        &UserUpdate {
            is_admin: Some(true),
            ..Default::default()
        },
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/admin/stats")
        .insert_header(("Authorization", admin.as_str()))
        .to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["recent_users"], 2);
    assert_eq!(stats["comments_per_post"], 0.0);
}
