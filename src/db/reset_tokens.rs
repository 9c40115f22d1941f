use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ResetToken;

/// Insert the user's token, replacing whatever token they already had.
pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    token: &str,
    created_at: DateTime<Utc>,
) -> Result<ResetToken, sqlx::Error> {
    sqlx::query_as::<_, ResetToken>(
        "INSERT INTO reset_tokens (user_id, token, created_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id) DO UPDATE
            SET token = EXCLUDED.token, created_at = EXCLUDED.created_at
         RETURNING *",
    )
    .bind(user_id)
    .bind(token)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<ResetToken>, sqlx::Error> {
    sqlx::query_as::<_, ResetToken>("SELECT * FROM reset_tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<ResetToken>, sqlx::Error> {
    sqlx::query_as::<_, ResetToken>("SELECT * FROM reset_tokens WHERE token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await
}

/// Delete the row only if it still carries `token`. Returns false when the
/// row was already gone or has been re-issued since it was read.
pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    token: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reset_tokens WHERE id = $1 AND token = $2")
        .bind(id)
        .bind(token)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
