// tests/user_api_tests.rs

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::app_helper::setup_app;
use common::auth_helper::{create_admin, create_citizen};
use common::request::{authed_get, create_request, send};
use common::test_data::API;
use serde_json::json;

#[tokio::test]
async fn test_admin_creates_user_and_duplicate_email_conflicts() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let payload = json!({
        "name": "Mike Johnson",
        "email": "mike.johnson@provider.com",
        "phone": "+1-555-0201",
        "role": "provider"
    });

    let (status, body) = send(
        &app.router,
        create_request("POST", &format!("{}/users", API), &admin.access_token, &payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "provider");
    assert_eq!(body["data"]["isActive"], true);
    assert!(body["data"]["department"].is_null());

    let (status, body) = send(
        &app.router,
        create_request("POST", &format!("{}/users", API), &admin.access_token, &payload),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_type"], "conflict");
}

#[tokio::test]
async fn test_citizen_cannot_create_users() {
    let app = setup_app().await;
    let citizen = create_citizen(&app.state).await;

    let (status, _) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/users", API),
            &citizen.access_token,
            &json!({ "name": "Eve", "email": "eve@example.com", "role": "admin" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_user_rejects_invalid_email() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;

    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            &format!("{}/users", API),
            &admin.access_token,
            &json!({ "name": "Nobody", "email": "not-an-email" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_errors"]["email"].is_array());
}

#[tokio::test]
async fn test_user_profile_visible_to_self_and_admin_only() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let alice = create_citizen(&app.state).await;
    let bob = create_citizen(&app.state).await;
    let uri = format!("{}/users/{}", API, alice.id);

    let (status, body) = send(&app.router, authed_get(&uri, &alice.access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], alice.email);

    let (status, _) = send(&app.router, authed_get(&uri, &admin.access_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, authed_get(&uri, &bob.access_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "forbidden");
}

#[tokio::test]
async fn test_deactivated_user_token_is_rejected() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;
    let citizen = create_citizen(&app.state).await;
    let profile = format!("{}/users/{}", API, citizen.id);

    let (status, _) = send(&app.router, authed_get(&profile, &citizen.access_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        create_request(
            "PATCH",
            &format!("{}/deactivate", profile),
            &admin.access_token,
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    let (status, body) = send(&app.router, authed_get(&profile, &citizen.access_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "unauthorized");
}

#[tokio::test]
async fn test_admin_cannot_deactivate_self() {
    let app = setup_app().await;
    let admin = create_admin(&app.state).await;

    let (status, body) = send(
        &app.router,
        create_request(
            "PATCH",
            &format!("{}/users/{}/deactivate", API, admin.id),
            &admin.access_token,
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "bad_request");
}

#[tokio::test]
async fn test_token_accepted_from_cookie_and_garbage_rejected() {
    let app = setup_app().await;
    let citizen = create_citizen(&app.state).await;
    let uri = format!("{}/users/{}", API, citizen.id);

    let request = Request::builder()
        .method(Method::GET)
        .uri(&uri)
        .header(header::COOKIE, format!("token={}", citizen.access_token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, authed_get(&uri, "not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
