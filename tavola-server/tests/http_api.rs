//! HTTP-level API tests
//!
//! Drive the assembled router with real requests: auth cookie flow,
//! purchase status codes, pagination envelope, reservation errors.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tavola_server::auth::IdentityKind;
use tavola_server::core::build_router;
use tower::util::ServiceExt;

fn app(test: &TestApp) -> Router {
    build_router(test.state.clone())
}

fn user_cookie(test: &TestApp, id: i64, email: &str) -> String {
    let token = test
        .state
        .jwt_service
        .generate_token(id, email, IdentityKind::User)
        .expect("token generation");
    format!("token={token}")
}

fn owner_cookie(test: &TestApp, id: i64, email: &str) -> String {
    let token = test
        .state
        .jwt_service
        .generate_token(id, email, IdentityKind::Owner)
        .expect("token generation");
    format!("token={token}")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_session_yields_401_and_clears_cookie() {
    let test = setup().await;

    let response = app(&test)
        .oneshot(get("/api/v1/user/profile"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("401 must clear the cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("Max-Age=0"));

    let body = body_json(response).await;
    assert_eq!(body["message"], "Please login first");
}

#[tokio::test]
async fn register_login_profile_flow() {
    let test = setup().await;

    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/user/register",
            None,
            json!({
                "name": "Maria",
                "email": "maria@example.com",
                "password": "kalimera-13!",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/user/login",
            None,
            json!({ "email": "maria@example.com", "password": "kalimera-13!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set the session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));

    let response = app(&test)
        .oneshot(get_with_cookie("/api/v1/user/profile", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["email"], "maria@example.com");
    assert_eq!(profile["confirmed_user"], false);
}

#[tokio::test]
async fn wrong_password_is_rejected_uniformly() {
    let test = setup().await;

    app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/user/register",
            None,
            json!({
                "name": "Maria",
                "email": "maria@example.com",
                "password": "kalimera-13!",
            }),
        ))
        .await
        .unwrap();

    // Wrong password and unknown email produce the same response
    for email in ["maria@example.com", "nobody@example.com"] {
        let response = app(&test)
            .oneshot(json_request(
                "POST",
                "/api/v1/user/login",
                None,
                json!({ "email": email, "password": "wrong-password" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid email or password");
    }
}

#[tokio::test]
async fn purchase_status_codes() {
    let test = setup().await;
    let owner = seed_owner(&test.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&test.pool, owner, "Psarotaverna").await;
    let cheap = seed_coupon(&test.pool, restaurant, 30).await;
    let pricey = seed_coupon(&test.pool, restaurant, 500).await;
    let user = seed_user(&test.pool, "diner@example.com", 50, true).await;
    let cookie = user_cookie(&test, user, "diner@example.com");

    // 201 on first purchase
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/coupons/purchase",
            Some(&cookie),
            json!({ "coupon_id": cheap }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let purchased = body_json(response).await;
    assert_eq!(purchased["coupon_id"], cheap);
    assert_eq!(user_points(&test.pool, user).await, 20);

    // 409 on the identical second request, debited exactly once
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/coupons/purchase",
            Some(&cookie),
            json!({ "coupon_id": cheap }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(user_points(&test.pool, user).await, 20);

    // 400 when points do not cover the cost
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/coupons/purchase",
            Some(&cookie),
            json!({ "coupon_id": pricey }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(user_points(&test.pool, user).await, 20);

    // 401 for an unverified account
    let unconfirmed = seed_user(&test.pool, "new@example.com", 100, false).await;
    let unconfirmed_cookie = user_cookie(&test, unconfirmed, "new@example.com");
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/coupons/purchase",
            Some(&unconfirmed_cookie),
            json!({ "coupon_id": pricey }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn available_coupons_require_restaurant_id() {
    let test = setup().await;
    let user = seed_user(&test.pool, "diner@example.com", 0, true).await;
    let cookie = user_cookie(&test, user, "diner@example.com");

    let response = app(&test)
        .oneshot(get_with_cookie("/api/v1/coupons/available", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "restaurant_id is required");
}

#[tokio::test]
async fn pagination_envelope_invariants() {
    let test = setup().await;
    let now = shared::util::now_millis();
    for i in 0..15 {
        sqlx::query("INSERT INTO testimonials (message, created_at) VALUES (?, ?)")
            .bind(format!("Great food {i}"))
            .bind(now)
            .execute(&test.pool)
            .await
            .unwrap();
    }

    let response = app(&test)
        .oneshot(get("/api/v1/testimonials?page=2&pageSize=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let records = body["records"].as_array().unwrap();
    let pagination = &body["Pagination"];
    assert_eq!(records.len(), 5);
    assert_eq!(pagination["currentPage"], 2);
    assert_eq!(pagination["recordsOnCurrentPage"], 5);
    // viewedRecords = (currentPage - 1) * pageSize + recordsOnCurrentPage
    assert_eq!(pagination["viewedRecords"], 15);
    assert_eq!(pagination["remainingRecords"], 0);
    assert_eq!(pagination["total"], 15);
}

#[tokio::test]
async fn reservation_error_statuses() {
    let test = setup().await;
    let owner = seed_owner(&test.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&test.pool, owner, "Psarotaverna").await;
    let user = seed_user(&test.pool, "diner@example.com", 50, true).await;
    let cookie = user_cookie(&test, user, "diner@example.com");

    // 401 unconfirmed account
    let unconfirmed = seed_user(&test.pool, "new@example.com", 50, false).await;
    let unconfirmed_cookie = user_cookie(&test, unconfirmed, "new@example.com");
    let payload = json!({
        "restaurant_id": restaurant,
        "date": "2026-03-15",
        "time": "19:30",
        "guest_count": 2,
    });
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/reservations",
            Some(&unconfirmed_cookie),
            payload.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 201 for a confirmed account
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/reservations",
            Some(&cookie),
            payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let reservation_id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], "pending");

    // 400 cancel without a reason
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/reservations/cancel/{reservation_id}"),
            Some(&cookie),
            json!({ "reason": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 404 cancelling someone else's reservation
    let stranger = seed_user(&test.pool, "stranger@example.com", 0, true).await;
    let stranger_cookie = user_cookie(&test, stranger, "stranger@example.com");
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/reservations/cancel/{reservation_id}"),
            Some(&stranger_cookie),
            json!({ "reason": "not mine" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // 403 owner patch from a different owner
    let other_owner = seed_owner(&test.pool, "other@example.com").await;
    let other_owner_cookie = owner_cookie(&test, other_owner, "other@example.com");
    let response = app(&test)
        .oneshot(json_request(
            "PATCH",
            "/api/v1/reservations/owner",
            Some(&other_owner_cookie),
            json!({ "reservation_id": reservation_id, "status": "confirmed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 400 cross-restaurant coupon reference
    let other_restaurant = seed_restaurant(&test.pool, other_owner, "Trattoria").await;
    let foreign_coupon = seed_coupon(&test.pool, other_restaurant, 10).await;
    tavola_server::db::repository::coupon::purchase(
        &test.pool,
        user,
        foreign_coupon,
        shared::util::now_millis(),
    )
    .await
    .unwrap();
    let response = app(&test)
        .oneshot(json_request(
            "POST",
            "/api/v1/reservations",
            Some(&cookie),
            json!({
                "restaurant_id": restaurant,
                "date": "2026-03-16",
                "time": "20:00",
                "guest_count": 2,
                "coupon_id": foreign_coupon,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_session_cannot_use_user_routes() {
    let test = setup().await;
    let owner = seed_owner(&test.pool, "owner@example.com").await;
    let cookie = owner_cookie(&test, owner, "owner@example.com");

    let response = app(&test)
        .oneshot(get_with_cookie("/api/v1/user/profile", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
