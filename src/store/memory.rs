use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, StoreError, StoreResult};
use crate::models::{NewUser, ResetToken, User, UserChanges};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Keyed by owning user: one outstanding token per account.
    reset_tokens: HashMap<Uuid, ResetToken>,
}

/// In-memory store with the same uniqueness rules as the Postgres schema.
/// Every instance starts empty, which gives each test its own sandbox.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reset_token_count(&self) -> usize {
        self.tables.read().await.reset_tokens.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict("email already in use".to_string()));
        }
        if tables.users.values().any(|u| u.username == new_user.username) {
            return Err(StoreError::Conflict("username already in use".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            avatar: new_user.avatar,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;

        if let Some(email) = &changes.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Conflict("email already in use".to_string()));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = Some(avatar);
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn upsert_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        created_at: DateTime<Utc>,
    ) -> StoreResult<ResetToken> {
        let mut tables = self.tables.write().await;

        let taken = tables
            .reset_tokens
            .values()
            .any(|t| t.user_id != user_id && t.token == token);
        if taken {
            return Err(StoreError::Conflict("reset token already in use".to_string()));
        }

        let id = tables
            .reset_tokens
            .get(&user_id)
            .map(|t| t.id)
            .unwrap_or_else(Uuid::now_v7);
        let reset_token = ResetToken {
            id,
            user_id,
            token: token.to_string(),
            created_at,
        };
        tables.reset_tokens.insert(user_id, reset_token.clone());

        Ok(reset_token)
    }

    async fn find_reset_token(&self, user_id: Uuid) -> StoreResult<Option<ResetToken>> {
        Ok(self.tables.read().await.reset_tokens.get(&user_id).cloned())
    }

    async fn find_user_by_reset_token(
        &self,
        token: &str,
    ) -> StoreResult<Option<(User, ResetToken)>> {
        let tables = self.tables.read().await;

        let Some(reset_token) = tables.reset_tokens.values().find(|t| t.token == token) else {
            return Ok(None);
        };

        Ok(tables
            .users
            .get(&reset_token.user_id)
            .map(|user| (user.clone(), reset_token.clone())))
    }

    async fn redeem_reset_token(
        &self,
        reset_token: &ResetToken,
        password_hash: &str,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let user_id = reset_token.user_id;

        let still_current = tables
            .reset_tokens
            .get(&user_id)
            .is_some_and(|t| t.id == reset_token.id && t.token == reset_token.token);
        if !still_current || !tables.users.contains_key(&user_id) {
            return Ok(false);
        }

        tables.reset_tokens.remove(&user_id);
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }

        Ok(true)
    }
}
