//! Coupon purchase transaction tests
//!
//! Points move if and only if the purchase row is inserted; duplicate
//! purchases are rejected without a second debit.

mod common;

use common::*;
use tavola_server::db::repository::{RepoError, coupon};

#[tokio::test]
async fn purchase_debits_points_and_records_exactly_one_row() {
    let app = setup().await;
    let owner = seed_owner(&app.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&app.pool, owner, "Psarotaverna").await;
    let coupon_id = seed_coupon(&app.pool, restaurant, 30).await;
    let user = seed_user(&app.pool, "diner@example.com", 50, true).await;

    let now = shared::util::now_millis();
    let purchased = coupon::purchase(&app.pool, user, coupon_id, now)
        .await
        .expect("purchase should succeed");

    assert_eq!(purchased.user_id, user);
    assert_eq!(purchased.coupon_id, coupon_id);
    assert!(!purchased.is_used);
    assert!(!purchased.is_locked);
    assert_eq!(purchased.purchased_at, now);

    assert_eq!(user_points(&app.pool, user).await, 20);
    assert_eq!(purchased_coupon_count(&app.pool, user, coupon_id).await, 1);
}

#[tokio::test]
async fn duplicate_purchase_rejected_and_debited_once() {
    let app = setup().await;
    let owner = seed_owner(&app.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&app.pool, owner, "Psarotaverna").await;
    let coupon_id = seed_coupon(&app.pool, restaurant, 30).await;
    let user = seed_user(&app.pool, "diner@example.com", 100, true).await;

    let now = shared::util::now_millis();
    coupon::purchase(&app.pool, user, coupon_id, now)
        .await
        .expect("first purchase should succeed");

    let err = coupon::purchase(&app.pool, user, coupon_id, now)
        .await
        .expect_err("second purchase must fail");
    assert!(matches!(err, RepoError::Duplicate(_)));

    // Debited exactly once, still exactly one row
    assert_eq!(user_points(&app.pool, user).await, 70);
    assert_eq!(purchased_coupon_count(&app.pool, user, coupon_id).await, 1);
}

#[tokio::test]
async fn insufficient_points_leaves_no_trace() {
    let app = setup().await;
    let owner = seed_owner(&app.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&app.pool, owner, "Psarotaverna").await;
    let coupon_id = seed_coupon(&app.pool, restaurant, 30).await;
    let user = seed_user(&app.pool, "diner@example.com", 10, true).await;

    let err = coupon::purchase(&app.pool, user, coupon_id, shared::util::now_millis())
        .await
        .expect_err("purchase must fail");
    assert!(matches!(err, RepoError::BusinessRule(_)));

    assert_eq!(user_points(&app.pool, user).await, 10);
    assert_eq!(purchased_coupon_count(&app.pool, user, coupon_id).await, 0);
}

#[tokio::test]
async fn unknown_coupon_is_not_found() {
    let app = setup().await;
    let user = seed_user(&app.pool, "diner@example.com", 50, true).await;

    let err = coupon::purchase(&app.pool, user, 9999, shared::util::now_millis())
        .await
        .expect_err("purchase must fail");
    assert!(matches!(err, RepoError::NotFound(_)));
    assert_eq!(user_points(&app.pool, user).await, 50);
}

#[tokio::test]
async fn exact_balance_purchase_succeeds_to_zero() {
    let app = setup().await;
    let owner = seed_owner(&app.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&app.pool, owner, "Psarotaverna").await;
    let coupon_id = seed_coupon(&app.pool, restaurant, 30).await;
    let user = seed_user(&app.pool, "diner@example.com", 30, true).await;

    coupon::purchase(&app.pool, user, coupon_id, shared::util::now_millis())
        .await
        .expect("purchase should succeed");
    assert_eq!(user_points(&app.pool, user).await, 0);
}
