//! Password Reset Repository
//!
//! Stores only the SHA-256 of each reset token; the plaintext token
//! lives in the emailed link and nowhere else. Requesting a new reset
//! invalidates any earlier one for the same account.

use super::RepoResult;
use sqlx::SqlitePool;

/// Reset tokens are valid for one hour
pub const RESET_TOKEN_TTL_MS: i64 = 60 * 60 * 1000;

pub async fn create_for_user(
    pool: &SqlitePool,
    user_id: i64,
    token_hash: &str,
    now: i64,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM password_resets WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "INSERT INTO password_resets (user_id, token_hash, expires_at, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(now + RESET_TOKEN_TTL_MS)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

/// Whether an unexpired reset token exists
pub async fn is_valid_for_user(
    pool: &SqlitePool,
    token_hash: &str,
    now: i64,
) -> RepoResult<bool> {
    let row: Option<i64> = sqlx::query_scalar(
        "SELECT user_id FROM password_resets WHERE token_hash = ? AND expires_at > ?",
    )
    .bind(token_hash)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Redeem a reset token, returning the user it belongs to.
///
/// The row is deleted in the same transaction so a token can be spent
/// at most once.
pub async fn consume_for_user(
    pool: &SqlitePool,
    token_hash: &str,
    now: i64,
) -> RepoResult<Option<i64>> {
    let mut tx = pool.begin().await?;
    let user_id: Option<i64> = sqlx::query_scalar(
        "SELECT user_id FROM password_resets WHERE token_hash = ? AND expires_at > ?",
    )
    .bind(token_hash)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    sqlx::query("DELETE FROM password_resets WHERE token_hash = ?")
        .bind(token_hash)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(Some(user_id))
}
