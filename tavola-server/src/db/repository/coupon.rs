//! Coupon Repository
//!
//! Coupon CRUD plus the purchase transaction. The purchase debits
//! loyalty points and records the purchase in one transaction: points
//! move if and only if the row is inserted.

use super::{RepoError, RepoResult};
use shared::models::{Coupon, CouponCreate, CouponUpdate, PurchasedCoupon, UserCoupon};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COUPON_SELECT: &str = "SELECT id, restaurant_id, description, discount_percentage, required_points, created_at FROM coupons";

const PURCHASED_SELECT: &str =
    "SELECT id, user_id, coupon_id, is_used, is_locked, purchased_at FROM purchased_coupons";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Coupon>> {
    let sql = format!("{} WHERE id = ?", COUPON_SELECT);
    let row = sqlx::query_as::<_, Coupon>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: &CouponCreate) -> RepoResult<Coupon> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO coupons (restaurant_id, description, discount_percentage, required_points, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
    )
    .bind(data.restaurant_id)
    .bind(&data.description)
    .bind(data.discount_percentage)
    .bind(data.required_points)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create coupon".into()))
}

/// Patch update over a fixed field list.
///
/// Existing purchases keep the terms they were bought under; only the
/// coupon row changes.
pub async fn update(pool: &SqlitePool, id: i64, data: &CouponUpdate) -> RepoResult<Coupon> {
    if data.description.is_none()
        && data.discount_percentage.is_none()
        && data.required_points.is_none()
    {
        return Err(RepoError::BusinessRule(
            "No valid fields provided for update".into(),
        ));
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE coupons SET ");
    let mut fields = qb.separated(", ");
    if let Some(description) = &data.description {
        fields
            .push("description = ")
            .push_bind_unseparated(description.clone());
    }
    if let Some(discount_percentage) = data.discount_percentage {
        fields
            .push("discount_percentage = ")
            .push_bind_unseparated(discount_percentage);
    }
    if let Some(required_points) = data.required_points {
        fields
            .push("required_points = ")
            .push_bind_unseparated(required_points);
    }
    qb.push(" WHERE id = ").push_bind(id);

    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Coupon {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Coupon {id} not found")))
}

/// Delete a coupon that has never been purchased.
///
/// Purchases are immutable, so a purchased coupon cannot be removed;
/// the foreign key on purchased_coupons backs this check.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let purchases: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM purchased_coupons WHERE coupon_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if purchases > 0 {
        return Err(RepoError::BusinessRule(
            "Coupon has been purchased and cannot be deleted".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM coupons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Prove the acting owner owns the coupon's restaurant
pub async fn verify_ownership(
    pool: &SqlitePool,
    coupon_id: i64,
    owner_id: i64,
) -> RepoResult<bool> {
    let row: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM restaurants r JOIN coupons c ON c.restaurant_id = r.id WHERE c.id = ? AND r.owner_id = ?",
    )
    .bind(coupon_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

// ── Listings ─────────────────────────────────────────────────

/// Coupons of a restaurant the user has not purchased yet
pub async fn find_available(
    pool: &SqlitePool,
    restaurant_id: i64,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Coupon>> {
    let sql = format!(
        "{} WHERE restaurant_id = ?1 AND id NOT IN (SELECT coupon_id FROM purchased_coupons WHERE user_id = ?2) ORDER BY id DESC LIMIT ?3 OFFSET ?4",
        COUPON_SELECT
    );
    let rows = sqlx::query_as::<_, Coupon>(&sql)
        .bind(restaurant_id)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_available(
    pool: &SqlitePool,
    restaurant_id: i64,
    user_id: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM coupons WHERE restaurant_id = ?1 AND id NOT IN (SELECT coupon_id FROM purchased_coupons WHERE user_id = ?2)",
    )
    .bind(restaurant_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Coupons the user has purchased, with their lock/use state
pub async fn find_user_coupons(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<UserCoupon>> {
    let rows = sqlx::query_as::<_, UserCoupon>(
        "SELECT c.id, c.restaurant_id, c.description, c.discount_percentage, c.required_points, pc.is_used, pc.is_locked, pc.purchased_at FROM purchased_coupons pc JOIN coupons c ON pc.coupon_id = c.id WHERE pc.user_id = ? ORDER BY pc.purchased_at DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_user_coupons(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchased_coupons WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn find_purchase(
    pool: &SqlitePool,
    user_id: i64,
    coupon_id: i64,
) -> RepoResult<Option<PurchasedCoupon>> {
    let sql = format!("{} WHERE user_id = ? AND coupon_id = ?", PURCHASED_SELECT);
    let row = sqlx::query_as::<_, PurchasedCoupon>(&sql)
        .bind(user_id)
        .bind(coupon_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

// ── Purchase transaction ─────────────────────────────────────

/// Purchase a coupon for the user.
///
/// Single transaction: duplicate check, balance check, point debit,
/// purchase insert. Any early return rolls back via the transaction
/// drop. The UNIQUE(user_id, coupon_id) index turns a lost race into
/// a `Duplicate` as well.
pub async fn purchase(
    pool: &SqlitePool,
    user_id: i64,
    coupon_id: i64,
    now: i64,
) -> RepoResult<PurchasedCoupon> {
    let mut tx = pool.begin().await?;

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM purchased_coupons WHERE user_id = ? AND coupon_id = ?")
            .bind(user_id)
            .bind(coupon_id)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(RepoError::Duplicate("Coupon already purchased".into()));
    }

    let required_points: Option<i64> =
        sqlx::query_scalar("SELECT required_points FROM coupons WHERE id = ?")
            .bind(coupon_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(required_points) = required_points else {
        return Err(RepoError::NotFound(format!("Coupon {coupon_id} not found")));
    };

    let balance: Option<i64> = sqlx::query_scalar("SELECT loyalty_points FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(balance) = balance else {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    };
    if balance < required_points {
        return Err(RepoError::BusinessRule("Insufficient loyalty points".into()));
    }

    sqlx::query("UPDATE users SET loyalty_points = loyalty_points - ?, updated_at = ? WHERE id = ?")
        .bind(required_points)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query_as::<_, PurchasedCoupon>(
        "INSERT INTO purchased_coupons (user_id, coupon_id, purchased_at) VALUES (?1, ?2, ?3) RETURNING id, user_id, coupon_id, is_used, is_locked, purchased_at",
    )
    .bind(user_id)
    .bind(coupon_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate("Coupon already purchased".into()),
        other => other,
    })?;

    tx.commit().await?;
    Ok(row)
}
