//! Account persistence behind a trait so the HTTP layer can run against
//! Postgres in production and an in-process map in tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewUser, ResetToken, User, UserChanges};

pub type SharedStore = Arc<dyn AccountStore>;

#[derive(Debug)]
pub enum StoreError {
    /// A unique column (email, username) already holds the value.
    Conflict(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            StoreError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;

    /// Returns `None` when no account has this id.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>>;

    /// Store `token` as the user's only reset token, overwriting any previous one.
    async fn upsert_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        created_at: DateTime<Utc>,
    ) -> StoreResult<ResetToken>;

    async fn find_reset_token(&self, user_id: Uuid) -> StoreResult<Option<ResetToken>>;

    /// Exact match on the token string.
    async fn find_user_by_reset_token(&self, token: &str)
    -> StoreResult<Option<(User, ResetToken)>>;

    /// Set the new credential and delete the token as one unit of work.
    /// Returns false, with nothing changed, if the token no longer exists.
    async fn redeem_reset_token(
        &self,
        reset_token: &ResetToken,
        password_hash: &str,
    ) -> StoreResult<bool>;
}
