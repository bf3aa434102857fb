//! Reservation Repository
//!
//! The reservation lifecycle and its coupon side effects. Every
//! multi-statement sequence (create with coupon lock, cancel with
//! penalty, owner confirm/cancel) runs inside one transaction; an
//! early error return drops the transaction and rolls back.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{RepoError, RepoResult};
use crate::utils::time::{combine_date_time, is_late_cancellation};
use shared::models::{
    Reservation, ReservationCreate, ReservationStatus, ReservationUpdateByOwner,
};

/// Points deducted when a user cancels inside the late window
pub const LATE_CANCEL_PENALTY_POINTS: i64 = 15;

const RESERVATION_COLUMNS: &str = "id, user_id, restaurant_id, date, time, guest_count, status, special_menu_id, coupon_id, cancellation_reason, reservation_notes, created_at, updated_at";

const RESERVATION_SELECT: &str = "SELECT id, user_id, restaurant_id, date, time, guest_count, status, special_menu_id, coupon_id, cancellation_reason, reservation_notes, created_at, updated_at FROM reservations";

/// Whitelisted listing filters (status, date)
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub date: Option<String>,
}

// ── Reads ────────────────────────────────────────────────────

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Reservation>> {
    let sql = format!("{} WHERE id = ?", RESERVATION_SELECT);
    let row = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Fetch scoped to the owning user; rows of other users do not exist
/// as far as the caller can tell
pub async fn find_by_id_for_user(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> RepoResult<Option<Reservation>> {
    let sql = format!("{} WHERE id = ? AND user_id = ?", RESERVATION_SELECT);
    let row = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Reservation>> {
    let sql = format!(
        "{} WHERE user_id = ? ORDER BY date DESC, time DESC",
        RESERVATION_SELECT
    );
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ReservationFilter, prefix: &str) {
    if let Some(status) = filter.status {
        qb.push(format!(" AND {prefix}status = "))
            .push_bind(status.as_str());
    }
    if let Some(date) = &filter.date {
        qb.push(format!(" AND {prefix}date = ")).push_bind(date.clone());
    }
}

pub async fn find_filtered_for_user(
    pool: &SqlitePool,
    user_id: i64,
    filter: &ReservationFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Reservation>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("{} WHERE user_id = ", RESERVATION_SELECT));
    qb.push_bind(user_id);
    push_filters(&mut qb, filter, "");
    qb.push(" ORDER BY date DESC, time DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let rows = qb.build_query_as::<Reservation>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn count_filtered_for_user(
    pool: &SqlitePool,
    user_id: i64,
    filter: &ReservationFilter,
) -> RepoResult<i64> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM reservations WHERE user_id = ");
    qb.push_bind(user_id);
    push_filters(&mut qb, filter, "");
    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

pub async fn find_filtered_for_owner(
    pool: &SqlitePool,
    owner_id: i64,
    filter: &ReservationFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Reservation>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT r.* FROM reservations r JOIN restaurants res ON r.restaurant_id = res.id WHERE res.owner_id = ",
    );
    qb.push_bind(owner_id);
    push_filters(&mut qb, filter, "r.");
    qb.push(" ORDER BY r.date DESC, r.time DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let rows = qb.build_query_as::<Reservation>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn count_filtered_for_owner(
    pool: &SqlitePool,
    owner_id: i64,
    filter: &ReservationFilter,
) -> RepoResult<i64> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT COUNT(*) FROM reservations r JOIN restaurants res ON r.restaurant_id = res.id WHERE res.owner_id = ",
    );
    qb.push_bind(owner_id);
    push_filters(&mut qb, filter, "r.");
    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

// ── Create ───────────────────────────────────────────────────

/// Create a reservation for the user.
///
/// Single transaction:
/// 1. If a coupon is referenced, lock the caller's unused, unlocked
///    purchase of it; zero rows means the coupon is not usable.
/// 2. Conditional insert: the row is only inserted when the referenced
///    special menu and coupon belong to the reservation's restaurant.
///    Check and insert are one statement, so there is no window for
///    the reference to change between them.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    data: &ReservationCreate,
    now: i64,
) -> RepoResult<Reservation> {
    let mut tx = pool.begin().await?;

    if let Some(coupon_id) = data.coupon_id {
        let locked = sqlx::query(
            "UPDATE purchased_coupons SET is_locked = 1 WHERE user_id = ? AND coupon_id = ? AND is_used = 0 AND is_locked = 0",
        )
        .bind(user_id)
        .bind(coupon_id)
        .execute(&mut *tx)
        .await?;
        if locked.rows_affected() == 0 {
            return Err(RepoError::BusinessRule(
                "Coupon is not available for this reservation".into(),
            ));
        }
    }

    let sql = format!(
        "INSERT INTO reservations (user_id, restaurant_id, date, time, guest_count, status, special_menu_id, coupon_id, reservation_notes, created_at, updated_at) \
         SELECT ?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7, ?8, ?9, ?9 \
         WHERE (?6 IS NULL OR EXISTS (SELECT 1 FROM special_menus sm WHERE sm.id = ?6 AND sm.restaurant_id = ?2)) \
           AND (?7 IS NULL OR EXISTS (SELECT 1 FROM coupons c WHERE c.id = ?7 AND c.restaurant_id = ?2)) \
         RETURNING {RESERVATION_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Reservation>(&sql)
        .bind(user_id)
        .bind(data.restaurant_id)
        .bind(&data.date)
        .bind(&data.time)
        .bind(data.guest_count)
        .bind(data.special_menu_id)
        .bind(data.coupon_id)
        .bind(&data.reservation_notes)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(reservation) = row else {
        return Err(RepoError::BusinessRule(
            "Special menu or coupon does not belong to this restaurant".into(),
        ));
    };

    tx.commit().await?;
    Ok(reservation)
}

// ── Cancel (user) ────────────────────────────────────────────

/// Cancel the user's reservation.
///
/// One transaction covers the whole read-compute-penalize-cancel-unlock
/// sequence: a cancellation inside the late window deducts the penalty
/// (floored at zero), the status flips to cancelled, and an attached
/// unused coupon is unlocked.
pub async fn cancel(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
    reason: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> RepoResult<Reservation> {
    let mut tx = pool.begin().await?;

    let sql = format!("{} WHERE id = ? AND user_id = ?", RESERVATION_SELECT);
    let existing = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(existing) = existing else {
        return Err(RepoError::NotFound("Reservation not found".into()));
    };

    if existing.status != ReservationStatus::Pending {
        return Err(RepoError::BusinessRule(
            "Only pending reservations can be cancelled".into(),
        ));
    }

    let scheduled = combine_date_time(&existing.date, &existing.time, tz)
        .ok_or_else(|| RepoError::Database(format!("Reservation {id} has invalid date/time")))?;
    let now_ms = now.timestamp_millis();

    if is_late_cancellation(scheduled, now) {
        sqlx::query(
            "UPDATE users SET loyalty_points = MAX(loyalty_points - ?, 0), updated_at = ? WHERE id = ?",
        )
        .bind(LATE_CANCEL_PENALTY_POINTS)
        .bind(now_ms)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    let update_sql = format!(
        "UPDATE reservations SET status = 'cancelled', cancellation_reason = ?, updated_at = ? WHERE id = ? RETURNING {RESERVATION_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Reservation>(&update_sql)
        .bind(reason)
        .bind(now_ms)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    if let Some(coupon_id) = existing.coupon_id {
        sqlx::query(
            "UPDATE purchased_coupons SET is_locked = 0 WHERE user_id = ? AND coupon_id = ? AND is_used = 0",
        )
        .bind(user_id)
        .bind(coupon_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(updated)
}

// ── Owner patch ──────────────────────────────────────────────

/// Confirm or cancel a reservation as the restaurant's owner.
///
/// Ownership resolves through the restaurant; a reservation in someone
/// else's restaurant is forbidden, not missing. Confirming spends an
/// attached coupon permanently; an owner cancellation unlocks it and
/// never costs the user points.
pub async fn update_by_owner(
    pool: &SqlitePool,
    owner_id: i64,
    data: &ReservationUpdateByOwner,
    now: i64,
) -> RepoResult<Reservation> {
    if !matches!(
        data.status,
        ReservationStatus::Confirmed | ReservationStatus::Cancelled
    ) {
        return Err(RepoError::BusinessRule(format!(
            "Cannot set reservation status to {}",
            data.status.as_str()
        )));
    }

    let mut tx = pool.begin().await?;

    let owned: Option<i64> = sqlx::query_scalar(
        "SELECT r.id FROM reservations r JOIN restaurants res ON r.restaurant_id = res.id WHERE r.id = ? AND res.owner_id = ?",
    )
    .bind(data.reservation_id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?;
    if owned.is_none() {
        return Err(RepoError::Forbidden(
            "You do not own this reservation's restaurant".into(),
        ));
    }

    let sql = format!("{} WHERE id = ?", RESERVATION_SELECT);
    let existing = sqlx::query_as::<_, Reservation>(&sql)
        .bind(data.reservation_id)
        .fetch_one(&mut *tx)
        .await?;

    if existing.status != ReservationStatus::Pending {
        return Err(RepoError::BusinessRule(format!(
            "Reservation is already {}",
            existing.status.as_str()
        )));
    }

    let update_sql = format!(
        "UPDATE reservations SET status = ?, cancellation_reason = COALESCE(?, cancellation_reason), updated_at = ? WHERE id = ? RETURNING {RESERVATION_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Reservation>(&update_sql)
        .bind(data.status.as_str())
        .bind(&data.cancellation_reason)
        .bind(now)
        .bind(data.reservation_id)
        .fetch_one(&mut *tx)
        .await?;

    if let Some(coupon_id) = existing.coupon_id {
        match data.status {
            // A confirmed visit spends the coupon permanently
            ReservationStatus::Confirmed => {
                sqlx::query(
                    "UPDATE purchased_coupons SET is_used = 1, is_locked = 0 WHERE user_id = ? AND coupon_id = ?",
                )
                .bind(existing.user_id)
                .bind(coupon_id)
                .execute(&mut *tx)
                .await?;
            }
            ReservationStatus::Cancelled => {
                sqlx::query(
                    "UPDATE purchased_coupons SET is_locked = 0 WHERE user_id = ? AND coupon_id = ? AND is_used = 0",
                )
                .bind(existing.user_id)
                .bind(coupon_id)
                .execute(&mut *tx)
                .await?;
            }
            _ => {}
        }
    }

    tx.commit().await?;
    Ok(updated)
}

// ── Delete ───────────────────────────────────────────────────

/// Hard delete scoped to the owning user.
///
/// Deliberately leaves purchased_coupons untouched, matching the
/// platform's historical behavior.
pub async fn delete(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM reservations WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
