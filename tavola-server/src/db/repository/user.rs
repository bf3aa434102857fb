//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserCreate, UserProfile, UserUpdate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const USER_SELECT: &str = "SELECT id, name, email, password, phone, google_id, facebook_id, loyalty_points, confirmed_user, created_at, updated_at FROM users";

const PROFILE_SELECT: &str =
    "SELECT id, name, email, phone, loyalty_points, confirmed_user FROM users";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE id = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE email = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn profile_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<UserProfile>> {
    let sql = format!("{} WHERE id = ?", PROFILE_SELECT);
    let row = sqlx::query_as::<_, UserProfile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: &UserCreate) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password, phone, google_id, facebook_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.password)
    .bind(&data.phone)
    .bind(&data.google_id)
    .bind(&data.facebook_id)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Patch update over a fixed field list; absent fields never reach the statement
pub async fn update(pool: &SqlitePool, id: i64, data: &UserUpdate) -> RepoResult<UserProfile> {
    let now = shared::util::now_millis();
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
    let mut fields = qb.separated(", ");
    if let Some(name) = &data.name {
        fields.push("name = ").push_bind_unseparated(name.clone());
    }
    if let Some(email) = &data.email {
        fields.push("email = ").push_bind_unseparated(email.clone());
    }
    if let Some(password) = &data.password {
        fields
            .push("password = ")
            .push_bind_unseparated(password.clone());
    }
    if let Some(phone) = &data.phone {
        fields.push("phone = ").push_bind_unseparated(phone.clone());
    }
    fields.push("updated_at = ").push_bind_unseparated(now);
    qb.push(" WHERE id = ").push_bind(id);

    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    profile_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn confirm_email(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query("UPDATE users SET confirmed_user = 1, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn loyalty_points(pool: &SqlitePool, id: i64) -> RepoResult<Option<i64>> {
    let points = sqlx::query_scalar("SELECT loyalty_points FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(points)
}

pub async fn set_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query("UPDATE users SET password = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── OAuth account lookup/linking ─────────────────────────────

pub async fn find_by_google_id(pool: &SqlitePool, google_id: &str) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE google_id = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(google_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_facebook_id(pool: &SqlitePool, facebook_id: &str) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE facebook_id = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(facebook_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn link_google(pool: &SqlitePool, id: i64, google_id: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query("UPDATE users SET google_id = ?, updated_at = ? WHERE id = ?")
        .bind(google_id)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn link_facebook(pool: &SqlitePool, id: i64, facebook_id: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query("UPDATE users SET facebook_id = ?, updated_at = ? WHERE id = ?")
        .bind(facebook_id)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
