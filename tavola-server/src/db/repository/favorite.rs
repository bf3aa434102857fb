//! Favorite Restaurants Repository

use super::RepoResult;
use shared::models::Restaurant;
use sqlx::SqlitePool;

/// Toggle a favorite; returns whether the restaurant is now favorited
pub async fn toggle(pool: &SqlitePool, user_id: i64, restaurant_id: i64) -> RepoResult<bool> {
    let removed = sqlx::query(
        "DELETE FROM user_favorite_restaurants WHERE user_id = ? AND restaurant_id = ?",
    )
    .bind(user_id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    if removed.rows_affected() > 0 {
        return Ok(false);
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO user_favorite_restaurants (user_id, restaurant_id, created_at) VALUES (?1, ?2, ?3)",
    )
    .bind(user_id)
    .bind(restaurant_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(true)
}

pub async fn find_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Restaurant>> {
    let rows = sqlx::query_as::<_, Restaurant>(
        "SELECT r.* FROM restaurants r JOIN user_favorite_restaurants f ON f.restaurant_id = r.id WHERE f.user_id = ? ORDER BY f.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
