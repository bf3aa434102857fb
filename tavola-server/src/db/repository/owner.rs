//! Owner Repository

use super::{RepoError, RepoResult};
use shared::models::{Owner, OwnerCreate, OwnerProfile, OwnerUpdate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const OWNER_SELECT: &str =
    "SELECT id, name, email, password, phone, created_at, updated_at FROM owners";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Owner>> {
    let sql = format!("{} WHERE id = ?", OWNER_SELECT);
    let row = sqlx::query_as::<_, Owner>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Owner>> {
    let sql = format!("{} WHERE email = ?", OWNER_SELECT);
    let row = sqlx::query_as::<_, Owner>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn profile_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OwnerProfile>> {
    let row =
        sqlx::query_as::<_, OwnerProfile>("SELECT id, name, email, phone FROM owners WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: &OwnerCreate) -> RepoResult<Owner> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO owners (name, email, password, phone, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.password)
    .bind(&data.phone)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create owner".into()))
}

/// Patch update over a fixed field list
pub async fn update(pool: &SqlitePool, id: i64, data: &OwnerUpdate) -> RepoResult<OwnerProfile> {
    let now = shared::util::now_millis();
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE owners SET ");
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
        return Err(RepoError::NotFound(format!("Owner {id} not found")));
    }
    profile_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Owner {id} not found")))
}
