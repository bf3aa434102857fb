//! Special Menu Repository
//!
//! Special menus and their link rows to menu items. Ownership always
//! resolves through the parent restaurant.

use super::{RepoError, RepoResult};
use shared::models::{SpecialMenu, SpecialMenuCreate, SpecialMenuItem, SpecialMenuItemLink};
use sqlx::SqlitePool;

const SPECIAL_MENU_SELECT: &str = "SELECT id, restaurant_id, name, description, original_price, discounted_price, discount_percentage, photo_url, availability, created_at FROM special_menus";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<SpecialMenu>> {
    let sql = format!("{} WHERE id = ?", SPECIAL_MENU_SELECT);
    let row = sqlx::query_as::<_, SpecialMenu>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<SpecialMenu>> {
    let sql = format!("{} WHERE restaurant_id = ? ORDER BY id", SPECIAL_MENU_SELECT);
    let rows = sqlx::query_as::<_, SpecialMenu>(&sql)
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: &SpecialMenuCreate) -> RepoResult<SpecialMenu> {
    let now = shared::util::now_millis();
    let availability = data.availability.unwrap_or(true);
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO special_menus (restaurant_id, name, description, original_price, discounted_price, discount_percentage, photo_url, availability, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING id",
    )
    .bind(data.restaurant_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.original_price)
    .bind(data.discounted_price)
    .bind(data.discount_percentage)
    .bind(&data.photo_url)
    .bind(availability)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create special menu".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM special_menus WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Prove the acting owner owns the special menu's restaurant
pub async fn verify_ownership(
    pool: &SqlitePool,
    special_menu_id: i64,
    owner_id: i64,
) -> RepoResult<bool> {
    let row: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM restaurants r JOIN special_menus sm ON sm.restaurant_id = r.id WHERE sm.id = ? AND r.owner_id = ?",
    )
    .bind(special_menu_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

// ── Link rows ────────────────────────────────────────────────

pub async fn add_item(
    pool: &SqlitePool,
    link: &SpecialMenuItemLink,
) -> RepoResult<SpecialMenuItem> {
    let row = sqlx::query_as::<_, SpecialMenuItem>(
        "INSERT INTO special_menu_items (special_menu_id, menu_item_id) VALUES (?1, ?2) RETURNING id, special_menu_id, menu_item_id",
    )
    .bind(link.special_menu_id)
    .bind(link.menu_item_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate("Menu item is already on this special menu".into())
        }
        other => other,
    })?;
    Ok(row)
}

pub async fn remove_item(pool: &SqlitePool, link: &SpecialMenuItemLink) -> RepoResult<bool> {
    let result = sqlx::query(
        "DELETE FROM special_menu_items WHERE special_menu_id = ? AND menu_item_id = ?",
    )
    .bind(link.special_menu_id)
    .bind(link.menu_item_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
