use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{AccountStore, StoreError, StoreResult};
use crate::db;
use crate::models::{NewUser, ResetToken, User, UserChanges};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    let conflict = match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            match db_err.constraint().unwrap_or_default() {
                c if c.contains("username") => Some("username already in use"),
                c if c.contains("email") => Some("email already in use"),
                c if c.contains("token") => Some("reset token already in use"),
                _ => None,
            }
        }
        _ => None,
    };

    match conflict {
        Some(msg) => StoreError::Conflict(msg.to_string()),
        None => StoreError::Database(err),
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(db::users::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(db::users::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(db::users::find_by_username(&self.pool, username).await?)
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        db::users::create(&self.pool, &new_user)
            .await
            .map_err(map_unique_violation)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        db::users::update(&self.pool, id, &changes)
            .await
            .map_err(map_unique_violation)
    }

    async fn upsert_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        created_at: DateTime<Utc>,
    ) -> StoreResult<ResetToken> {
        db::reset_tokens::upsert(&self.pool, user_id, token, created_at)
            .await
            .map_err(map_unique_violation)
    }

    async fn find_reset_token(&self, user_id: Uuid) -> StoreResult<Option<ResetToken>> {
        Ok(db::reset_tokens::find_by_user(&self.pool, user_id).await?)
    }

    async fn find_user_by_reset_token(
        &self,
        token: &str,
    ) -> StoreResult<Option<(User, ResetToken)>> {
        let Some(reset_token) = db::reset_tokens::find_by_token(&self.pool, token).await? else {
            return Ok(None);
        };

        let user = db::users::find_by_id(&self.pool, reset_token.user_id).await?;
        Ok(user.map(|user| (user, reset_token)))
    }

    async fn redeem_reset_token(
        &self,
        reset_token: &ResetToken,
        password_hash: &str,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Delete first so a concurrent redemption of the same token blocks on
        // the row lock and then sees zero rows.
        if !db::reset_tokens::delete(&mut *tx, reset_token.id, &reset_token.token).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        db::users::update_password(&mut *tx, reset_token.user_id, password_hash).await?;
        tx.commit().await?;

        Ok(true)
    }
}
