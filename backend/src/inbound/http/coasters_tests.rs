//! Tests for coaster provisioning and preview handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;
use uuid::Uuid;

use super::*;
use crate::domain::UserId;
use crate::domain::ports::FixtureLoginService;
use crate::domain::AuthenticatedUser;
use crate::inbound::http::users::LoginRequestBody;

fn test_app(admin: bool) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState {
        login: Arc::new(FixtureLoginService {
            user: AuthenticatedUser {
                id: UserId::from_uuid(Uuid::from_u128(1)),
                is_admin: admin,
            },
            ..FixtureLoginService::default()
        }),
        ..HttpState::default()
    };
    App::new()
        .app_data(web::Data::new(state))
        .wrap(crate::inbound::http::test_utils::test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(crate::inbound::http::users::login)
                .service(create_coaster)
                .service(batch_create_coasters)
                .service(preview_coaster)
                .service(latest_artworks),
        )
}

async fn login_and_get_cookie(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> actix_web::cookie::Cookie<'static> {
    let login_req = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequestBody {
            email: "admin@zd.md".into(),
            password: "password".into(),
        })
        .to_request();
    let login_res = actix_test::call_service(app, login_req).await;
    assert!(login_res.status().is_success());
    login_res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

fn sample_create_payload() -> Value {
    serde_json::json!({
        "artworkId": "00000000-0000-0000-0000-000000000007",
        "venueId": "00000000-0000-0000-0000-000000000008"
    })
}

#[actix_web::test]
async fn admin_can_provision_a_coaster() {
    let app = actix_test::init_service(test_app(true)).await;
    let cookie = login_and_get_cookie(&app).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/coasters")
        .cookie(cookie)
        .set_json(sample_create_payload())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("code").and_then(Value::as_str), Some("A2B3"));
    assert_eq!(
        body.get("shareUrl").and_then(Value::as_str),
        Some("https://zd.md/A2B3")
    );
}

#[actix_web::test]
async fn provisioning_requires_a_session() {
    let app = actix_test::init_service(test_app(true)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/coasters")
            .set_json(sample_create_payload())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn provisioning_requires_the_admin_capability() {
    let app = actix_test::init_service(test_app(false)).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/coasters")
            .cookie(cookie)
            .set_json(sample_create_payload())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn malformed_artwork_id_is_a_validation_error() {
    let app = actix_test::init_service(test_app(true)).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/coasters")
            .cookie(cookie)
            .set_json(serde_json::json!({ "artworkId": "not-a-uuid" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn batch_provisioning_returns_one_body_per_coaster() {
    let app = actix_test::init_service(test_app(true)).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/coasters/batch")
            .cookie(cookie)
            .set_json(serde_json::json!({
                "artworkId": "00000000-0000-0000-0000-000000000007",
                "count": 2,
                "venueId": "00000000-0000-0000-0000-000000000008"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn oversized_batch_is_rejected_before_any_write() {
    let app = actix_test::init_service(test_app(true)).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/coasters/batch")
            .cookie(cookie)
            .set_json(serde_json::json!({
                "artworkId": "00000000-0000-0000-0000-000000000007",
                "count": MAX_BATCH_SIZE + 1
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn preview_is_public_and_reports_first_scan_state() {
    let app = actix_test::init_service(test_app(true)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/coasters/A2B3")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("isFirstScan").and_then(Value::as_bool), Some(true));
    assert_eq!(
        body.pointer("/artwork/status").and_then(Value::as_str),
        Some("APPROVED")
    );
}

#[actix_web::test]
async fn preview_of_unknown_code_is_not_found() {
    let app = actix_test::init_service(test_app(true)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/coasters/ZZZZ")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn latest_artworks_is_public() {
    let app = actix_test::init_service(test_app(true)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/artworks/latest")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}
