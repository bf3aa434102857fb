//! Testimonial Repository

use super::RepoResult;
use shared::models::Testimonial;
use sqlx::SqlitePool;

pub async fn find_page(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Testimonial>> {
    let rows = sqlx::query_as::<_, Testimonial>(
        "SELECT id, message FROM testimonials ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM testimonials")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
