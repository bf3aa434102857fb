//! Shared test fixtures: a real (temp-file) database, server state,
//! and seed helpers.

#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;

use shared::models::{CouponCreate, OwnerCreate, RestaurantCreate, SpecialMenuCreate, UserCreate};
use tavola_server::core::{Config, ServerState};
use tavola_server::db::repository::{coupon, owner, restaurant, special_menu, user};

pub struct TestApp {
    pub state: ServerState,
    pub pool: SqlitePool,
    // Kept alive so the database file outlives the test
    _dir: TempDir,
}

pub async fn setup() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("tavola-test.db");

    let mut config = Config::with_overrides(db_path.to_string_lossy().to_string(), 0);
    // Tests hammer the API from one address; keep the limiter out of the way
    config.rate_limit.points = 100_000;

    let state = ServerState::initialize(&config).await;
    TestApp {
        pool: state.pool.clone(),
        state,
        _dir: dir,
    }
}

/// Insert a user with the given points balance and confirmation state
pub async fn seed_user(pool: &SqlitePool, email: &str, points: i64, confirmed: bool) -> i64 {
    let created = user::create(
        pool,
        &UserCreate {
            name: "Test User".into(),
            email: email.into(),
            password: Some("$argon2id$not-a-real-hash".into()),
            phone: None,
            google_id: None,
            facebook_id: None,
        },
    )
    .await
    .expect("Failed to seed user");

    sqlx::query("UPDATE users SET loyalty_points = ?, confirmed_user = ? WHERE id = ?")
        .bind(points)
        .bind(confirmed)
        .bind(created.id)
        .execute(pool)
        .await
        .expect("Failed to set user points");

    created.id
}

pub async fn seed_owner(pool: &SqlitePool, email: &str) -> i64 {
    let created = owner::create(
        pool,
        &OwnerCreate {
            name: "Test Owner".into(),
            email: email.into(),
            password: "$argon2id$not-a-real-hash".into(),
            phone: None,
        },
    )
    .await
    .expect("Failed to seed owner");
    created.id
}

pub async fn seed_restaurant(pool: &SqlitePool, owner_id: i64, name: &str) -> i64 {
    let created = restaurant::create(
        pool,
        owner_id,
        &RestaurantCreate {
            name: name.into(),
            location: "Athens".into(),
            cuisine: "Greek".into(),
            address: None,
            lat: None,
            lng: None,
            opening_hours: None,
            contact: None,
        },
    )
    .await
    .expect("Failed to seed restaurant");
    created.id
}

pub async fn seed_coupon(pool: &SqlitePool, restaurant_id: i64, required_points: i64) -> i64 {
    let created = coupon::create(
        pool,
        &CouponCreate {
            restaurant_id,
            description: "10% off dinner".into(),
            discount_percentage: 10.0,
            required_points,
        },
    )
    .await
    .expect("Failed to seed coupon");
    created.id
}

pub async fn seed_special_menu(pool: &SqlitePool, restaurant_id: i64) -> i64 {
    let created = special_menu::create(
        pool,
        &SpecialMenuCreate {
            restaurant_id,
            name: "Tasting menu".into(),
            description: None,
            original_price: 40.0,
            discounted_price: 30.0,
            discount_percentage: 25.0,
            photo_url: None,
            availability: Some(true),
        },
    )
    .await
    .expect("Failed to seed special menu");
    created.id
}

pub async fn user_points(pool: &SqlitePool, user_id: i64) -> i64 {
    user::loyalty_points(pool, user_id)
        .await
        .expect("Failed to read points")
        .expect("User missing")
}

pub async fn purchased_coupon_count(pool: &SqlitePool, user_id: i64, coupon_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM purchased_coupons WHERE user_id = ? AND coupon_id = ?")
        .bind(user_id)
        .bind(coupon_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count purchases")
}

pub async fn reservation_count(pool: &SqlitePool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count reservations")
}
