//! Reservation lifecycle tests
//!
//! Creation with coupon locking, the single-transaction cancel with
//! late penalty, owner confirmation/cancellation, and the coupon side
//! effects of each.

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use shared::models::{
    ReservationCreate, ReservationStatus, ReservationUpdateByOwner,
};
use tavola_server::db::repository::{RepoError, coupon, reservation};

fn reservation_payload(restaurant_id: i64) -> ReservationCreate {
    ReservationCreate {
        restaurant_id,
        date: "2026-03-15".into(),
        time: "19:30".into(),
        guest_count: 2,
        special_menu_id: None,
        coupon_id: None,
        reservation_notes: Some("window table".into()),
    }
}

struct Scenario {
    app: TestApp,
    user: i64,
    owner: i64,
    restaurant: i64,
    coupon: i64,
}

/// Confirmed user with 50 points holding a purchased 30-point coupon
async fn purchased_coupon_scenario() -> Scenario {
    let app = setup().await;
    let owner = seed_owner(&app.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&app.pool, owner, "Psarotaverna").await;
    let coupon_id = seed_coupon(&app.pool, restaurant, 30).await;
    let user = seed_user(&app.pool, "diner@example.com", 50, true).await;

    coupon::purchase(&app.pool, user, coupon_id, shared::util::now_millis())
        .await
        .expect("purchase should succeed");

    Scenario {
        app,
        user,
        owner,
        restaurant,
        coupon: coupon_id,
    }
}

#[tokio::test]
async fn create_starts_pending_and_locks_coupon() {
    let s = purchased_coupon_scenario().await;

    let mut payload = reservation_payload(s.restaurant);
    payload.coupon_id = Some(s.coupon);

    let created = reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .expect("create should succeed");

    assert_eq!(created.status, ReservationStatus::Pending);
    assert_eq!(created.coupon_id, Some(s.coupon));
    assert_eq!(created.reservation_notes.as_deref(), Some("window table"));

    let purchase = coupon::find_purchase(&s.app.pool, s.user, s.coupon)
        .await
        .unwrap()
        .unwrap();
    assert!(purchase.is_locked);
    assert!(!purchase.is_used);
}

#[tokio::test]
async fn create_rejects_coupon_from_another_restaurant_and_rolls_back_lock() {
    let s = purchased_coupon_scenario().await;
    let other_owner = seed_owner(&s.app.pool, "other@example.com").await;
    let other_restaurant = seed_restaurant(&s.app.pool, other_owner, "Trattoria").await;

    // Coupon belongs to s.restaurant; reservation targets other_restaurant
    let mut payload = reservation_payload(other_restaurant);
    payload.coupon_id = Some(s.coupon);

    let err = reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .expect_err("create must fail");
    assert!(matches!(err, RepoError::BusinessRule(_)));

    // No reservation row, and the coupon lock was rolled back with it
    assert_eq!(reservation_count(&s.app.pool, s.user).await, 0);
    let purchase = coupon::find_purchase(&s.app.pool, s.user, s.coupon)
        .await
        .unwrap()
        .unwrap();
    assert!(!purchase.is_locked);
}

#[tokio::test]
async fn create_rejects_special_menu_from_another_restaurant() {
    let s = purchased_coupon_scenario().await;
    let other_owner = seed_owner(&s.app.pool, "other@example.com").await;
    let other_restaurant = seed_restaurant(&s.app.pool, other_owner, "Trattoria").await;
    let foreign_menu = seed_special_menu(&s.app.pool, other_restaurant).await;

    let mut payload = reservation_payload(s.restaurant);
    payload.special_menu_id = Some(foreign_menu);

    let err = reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .expect_err("create must fail");
    assert!(matches!(err, RepoError::BusinessRule(_)));
    assert_eq!(reservation_count(&s.app.pool, s.user).await, 0);
}

#[tokio::test]
async fn locked_coupon_cannot_back_a_second_reservation() {
    let s = purchased_coupon_scenario().await;

    let mut payload = reservation_payload(s.restaurant);
    payload.coupon_id = Some(s.coupon);
    reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .expect("first create should succeed");

    let err = reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .expect_err("second create must fail");
    assert!(matches!(err, RepoError::BusinessRule(_)));
    assert_eq!(reservation_count(&s.app.pool, s.user).await, 1);
}

// ── Cancellation ─────────────────────────────────────────────

#[tokio::test]
async fn late_cancel_deducts_penalty() {
    let s = purchased_coupon_scenario().await;
    let created = reservation::create(
        &s.app.pool,
        s.user,
        &reservation_payload(s.restaurant),
        shared::util::now_millis(),
    )
    .await
    .unwrap();

    // Reservation at 19:30 UTC, cancelled at 18:30, one hour before
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 18, 30, 0).unwrap();
    let cancelled = reservation::cancel(
        &s.app.pool,
        created.id,
        s.user,
        "change of plans",
        chrono_tz::UTC,
        now,
    )
    .await
    .expect("cancel should succeed");

    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("change of plans"));
    // 50 - 30 (purchase) - 15 (penalty) = 5
    assert_eq!(user_points(&s.app.pool, s.user).await, 5);
}

#[tokio::test]
async fn early_cancel_costs_nothing() {
    let s = purchased_coupon_scenario().await;
    let created = reservation::create(
        &s.app.pool,
        s.user,
        &reservation_payload(s.restaurant),
        shared::util::now_millis(),
    )
    .await
    .unwrap();

    // Cancelled at 15:30, four hours before
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 15, 30, 0).unwrap();
    reservation::cancel(
        &s.app.pool,
        created.id,
        s.user,
        "change of plans",
        chrono_tz::UTC,
        now,
    )
    .await
    .expect("cancel should succeed");

    assert_eq!(user_points(&s.app.pool, s.user).await, 20);
}

#[tokio::test]
async fn cancel_after_reservation_time_costs_nothing() {
    let s = purchased_coupon_scenario().await;
    let created = reservation::create(
        &s.app.pool,
        s.user,
        &reservation_payload(s.restaurant),
        shared::util::now_millis(),
    )
    .await
    .unwrap();

    // Reservation already passed
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 21, 0, 0).unwrap();
    reservation::cancel(&s.app.pool, created.id, s.user, "no-show", chrono_tz::UTC, now)
        .await
        .expect("cancel should succeed");

    assert_eq!(user_points(&s.app.pool, s.user).await, 20);
}

#[tokio::test]
async fn penalty_floors_at_zero() {
    let app = setup().await;
    let owner = seed_owner(&app.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&app.pool, owner, "Psarotaverna").await;
    let user = seed_user(&app.pool, "diner@example.com", 10, true).await;

    let created = reservation::create(
        &app.pool,
        user,
        &reservation_payload(restaurant),
        shared::util::now_millis(),
    )
    .await
    .unwrap();

    let now = Utc.with_ymd_and_hms(2026, 3, 15, 19, 0, 0).unwrap();
    reservation::cancel(&app.pool, created.id, user, "late", chrono_tz::UTC, now)
        .await
        .expect("cancel should succeed");

    // 10 - 15 floors at 0, never negative
    assert_eq!(user_points(&app.pool, user).await, 0);
}

#[tokio::test]
async fn cancel_unlocks_attached_coupon() {
    let s = purchased_coupon_scenario().await;
    let mut payload = reservation_payload(s.restaurant);
    payload.coupon_id = Some(s.coupon);
    let created = reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .unwrap();

    let now = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
    reservation::cancel(&s.app.pool, created.id, s.user, "sick", chrono_tz::UTC, now)
        .await
        .unwrap();

    let purchase = coupon::find_purchase(&s.app.pool, s.user, s.coupon)
        .await
        .unwrap()
        .unwrap();
    assert!(!purchase.is_locked);
    assert!(!purchase.is_used);
}

#[tokio::test]
async fn cancel_is_scoped_to_the_owning_user() {
    let s = purchased_coupon_scenario().await;
    let stranger = seed_user(&s.app.pool, "stranger@example.com", 0, true).await;
    let created = reservation::create(
        &s.app.pool,
        s.user,
        &reservation_payload(s.restaurant),
        shared::util::now_millis(),
    )
    .await
    .unwrap();

    let now = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
    let err = reservation::cancel(&s.app.pool, created.id, stranger, "mine now", chrono_tz::UTC, now)
        .await
        .expect_err("cancel must fail");
    assert!(matches!(err, RepoError::NotFound(_)));
}

// ── Owner confirmation / cancellation ────────────────────────

#[tokio::test]
async fn owner_confirm_spends_the_coupon() {
    let s = purchased_coupon_scenario().await;
    let mut payload = reservation_payload(s.restaurant);
    payload.coupon_id = Some(s.coupon);
    let created = reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .unwrap();

    let confirmed = reservation::update_by_owner(
        &s.app.pool,
        s.owner,
        &ReservationUpdateByOwner {
            reservation_id: created.id,
            status: ReservationStatus::Confirmed,
            cancellation_reason: None,
        },
        shared::util::now_millis(),
    )
    .await
    .expect("confirm should succeed");

    assert_eq!(confirmed.status, ReservationStatus::Confirmed);
    let purchase = coupon::find_purchase(&s.app.pool, s.user, s.coupon)
        .await
        .unwrap()
        .unwrap();
    assert!(purchase.is_used);
    assert!(!purchase.is_locked);
}

#[tokio::test]
async fn owner_cancel_unlocks_coupon_without_penalty() {
    let s = purchased_coupon_scenario().await;
    let mut payload = reservation_payload(s.restaurant);
    payload.coupon_id = Some(s.coupon);
    let created = reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .unwrap();

    let cancelled = reservation::update_by_owner(
        &s.app.pool,
        s.owner,
        &ReservationUpdateByOwner {
            reservation_id: created.id,
            status: ReservationStatus::Cancelled,
            cancellation_reason: Some("kitchen closed".into()),
        },
        shared::util::now_millis(),
    )
    .await
    .expect("owner cancel should succeed");

    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("kitchen closed"));

    // No penalty for owner-initiated cancellation
    assert_eq!(user_points(&s.app.pool, s.user).await, 20);
    let purchase = coupon::find_purchase(&s.app.pool, s.user, s.coupon)
        .await
        .unwrap()
        .unwrap();
    assert!(!purchase.is_locked);
    assert!(!purchase.is_used);
}

#[tokio::test]
async fn foreign_owner_is_forbidden() {
    let s = purchased_coupon_scenario().await;
    let other_owner = seed_owner(&s.app.pool, "other@example.com").await;
    let created = reservation::create(
        &s.app.pool,
        s.user,
        &reservation_payload(s.restaurant),
        shared::util::now_millis(),
    )
    .await
    .unwrap();

    let err = reservation::update_by_owner(
        &s.app.pool,
        other_owner,
        &ReservationUpdateByOwner {
            reservation_id: created.id,
            status: ReservationStatus::Confirmed,
            cancellation_reason: None,
        },
        shared::util::now_millis(),
    )
    .await
    .expect_err("must be forbidden");
    assert!(matches!(err, RepoError::Forbidden(_)));
}

#[tokio::test]
async fn terminal_reservations_cannot_be_patched_again() {
    let s = purchased_coupon_scenario().await;
    let created = reservation::create(
        &s.app.pool,
        s.user,
        &reservation_payload(s.restaurant),
        shared::util::now_millis(),
    )
    .await
    .unwrap();

    let patch = ReservationUpdateByOwner {
        reservation_id: created.id,
        status: ReservationStatus::Confirmed,
        cancellation_reason: None,
    };
    reservation::update_by_owner(&s.app.pool, s.owner, &patch, shared::util::now_millis())
        .await
        .unwrap();

    let err = reservation::update_by_owner(&s.app.pool, s.owner, &patch, shared::util::now_millis())
        .await
        .expect_err("second confirm must fail");
    assert!(matches!(err, RepoError::BusinessRule(_)));
}

#[tokio::test]
async fn seated_is_not_a_reachable_status() {
    let s = purchased_coupon_scenario().await;
    let created = reservation::create(
        &s.app.pool,
        s.user,
        &reservation_payload(s.restaurant),
        shared::util::now_millis(),
    )
    .await
    .unwrap();

    let err = reservation::update_by_owner(
        &s.app.pool,
        s.owner,
        &ReservationUpdateByOwner {
            reservation_id: created.id,
            status: ReservationStatus::Seated,
            cancellation_reason: None,
        },
        shared::util::now_millis(),
    )
    .await
    .expect_err("seated must be rejected");
    assert!(matches!(err, RepoError::BusinessRule(_)));
}

// ── Delete ───────────────────────────────────────────────────

#[tokio::test]
async fn delete_is_scoped_and_leaves_coupon_state_alone() {
    let s = purchased_coupon_scenario().await;
    let stranger = seed_user(&s.app.pool, "stranger@example.com", 0, true).await;
    let mut payload = reservation_payload(s.restaurant);
    payload.coupon_id = Some(s.coupon);
    let created = reservation::create(&s.app.pool, s.user, &payload, shared::util::now_millis())
        .await
        .unwrap();

    assert!(!reservation::delete(&s.app.pool, created.id, stranger)
        .await
        .unwrap());
    assert!(reservation::delete(&s.app.pool, created.id, s.user)
        .await
        .unwrap());
    assert_eq!(reservation_count(&s.app.pool, s.user).await, 0);

    // Deleting does not unlock the coupon (historical platform behavior)
    let purchase = coupon::find_purchase(&s.app.pool, s.user, s.coupon)
        .await
        .unwrap()
        .unwrap();
    assert!(purchase.is_locked);
}

// ── End-to-end scenario ──────────────────────────────────────

#[tokio::test]
async fn full_coupon_reservation_lifecycle() {
    let app = setup().await;
    let owner = seed_owner(&app.pool, "owner@example.com").await;
    let restaurant = seed_restaurant(&app.pool, owner, "Psarotaverna").await;
    let coupon_id = seed_coupon(&app.pool, restaurant, 30).await;
    let user = seed_user(&app.pool, "diner@example.com", 50, true).await;

    // Purchase: 50 - 30 = 20
    coupon::purchase(&app.pool, user, coupon_id, shared::util::now_millis())
        .await
        .unwrap();
    assert_eq!(user_points(&app.pool, user).await, 20);

    // Reserve with the coupon: locked
    let mut payload = reservation_payload(restaurant);
    payload.coupon_id = Some(coupon_id);
    let created = reservation::create(&app.pool, user, &payload, shared::util::now_millis())
        .await
        .unwrap();
    let purchase = coupon::find_purchase(&app.pool, user, coupon_id)
        .await
        .unwrap()
        .unwrap();
    assert!(purchase.is_locked);

    // Owner confirms: coupon used and unlocked
    reservation::update_by_owner(
        &app.pool,
        owner,
        &ReservationUpdateByOwner {
            reservation_id: created.id,
            status: ReservationStatus::Confirmed,
            cancellation_reason: None,
        },
        shared::util::now_millis(),
    )
    .await
    .unwrap();
    let purchase = coupon::find_purchase(&app.pool, user, coupon_id)
        .await
        .unwrap()
        .unwrap();
    assert!(purchase.is_used);
    assert!(!purchase.is_locked);

    // A different owner cannot touch the reservation
    let other_owner = seed_owner(&app.pool, "other@example.com").await;
    let err = reservation::update_by_owner(
        &app.pool,
        other_owner,
        &ReservationUpdateByOwner {
            reservation_id: created.id,
            status: ReservationStatus::Confirmed,
            cancellation_reason: None,
        },
        shared::util::now_millis(),
    )
    .await
    .expect_err("foreign owner must be rejected");
    assert!(matches!(err, RepoError::Forbidden(_)));
}
