//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate};
use sqlx::SqlitePool;

const MENU_ITEM_SELECT: &str =
    "SELECT id, restaurant_id, name, price, category, description, discount, created_at FROM menu_items";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let sql = format!("{} WHERE id = ?", MENU_ITEM_SELECT);
    let row = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<MenuItem>> {
    let sql = format!("{} WHERE restaurant_id = ? ORDER BY id", MENU_ITEM_SELECT);
    let rows = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: &MenuItemCreate) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO menu_items (restaurant_id, name, price, category, description, discount, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
    )
    .bind(data.restaurant_id)
    .bind(&data.name)
    .bind(data.price)
    .bind(&data.category)
    .bind(&data.description)
    .bind(data.discount)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

/// Delete scoped to the restaurant so an id from another restaurant is a no-op
pub async fn delete(pool: &SqlitePool, id: i64, restaurant_id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM menu_items WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
