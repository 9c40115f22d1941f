//! Password-reset token lifecycle: issuance by email, then single-use
//! redemption inside a fixed time window.
//!
//! A token moves `issued -> redeemed` (row deleted) or `issued -> expired`
//! (row kept but no longer accepted). Issuing again for the same account
//! overwrites whatever token it had, expired or not.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::email::{Mail, Mailer, templates};
use crate::error::AppError;
use crate::password;
use crate::store::SharedStore;

/// Random bytes per token; hex encoding doubles the length.
pub const TOKEN_BYTES: usize = 24;

#[derive(Debug, Clone)]
pub struct RecoverySettings {
    pub mail_from: String,
    pub product_name: String,
    pub token_ttl: Duration,
}

impl RecoverySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mail_from: config.mail_from.clone(),
            product_name: config.product_name.clone(),
            token_ttl: config.reset_token_ttl,
        }
    }
}

pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Append the token to the caller-supplied base URL as a query parameter.
pub fn reset_link(base: &str, token: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}token={token}")
}

/// Absolute distance between issuance and `now`, so a clock running behind
/// the database still yields a positive age.
pub fn token_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    if now >= created_at {
        now - created_at
    } else {
        created_at - now
    }
}

/// A token exactly `ttl` old is still accepted.
pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    token_age(created_at, now) > ttl
}

pub struct PasswordRecovery {
    store: SharedStore,
    mailer: Arc<dyn Mailer>,
    settings: RecoverySettings,
}

impl PasswordRecovery {
    pub fn new(store: SharedStore, mailer: Arc<dyn Mailer>, settings: RecoverySettings) -> Self {
        Self {
            store,
            mailer,
            settings,
        }
    }

    /// Issue a fresh token for the account owning `email` and mail it a link
    /// built from `reset_password_url`. Mail failures surface to the caller.
    pub async fn request_reset(&self, email: &str, reset_password_url: &str) -> Result<(), AppError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        let token = generate_token();
        self.store
            .upsert_reset_token(user.id, &token, Utc::now())
            .await?;

        let link = reset_link(reset_password_url, &token);
        let mail = Mail {
            from: self.settings.mail_from.clone(),
            to: user.email.clone(),
            subject: format!("{}: Password recovery", self.settings.product_name),
            html: templates::render_password_recovery(
                &self.settings.product_name,
                &user.username,
                &link,
            ),
        };

        self.mailer.send(mail).await.map_err(AppError::Internal)?;

        tracing::info!(user_id = %user.id, "Password reset token issued");
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        self.reset_password_at(token, new_password, Utc::now()).await
    }

    /// Redeem `token` as of `now`. Unknown and already-used tokens are both
    /// `NotFound`; an expired token is left in place.
    pub async fn reset_password_at(
        &self,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let (user, reset_token) = self
            .store
            .find_user_by_reset_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("token not found".to_string()))?;

        if is_expired(reset_token.created_at, now, self.settings.token_ttl) {
            tracing::info!(user_id = %user.id, "Rejected expired password reset token");
            return Err(AppError::TokenExpired);
        }

        let pw_hash = password::hash(new_password).map_err(AppError::Internal)?;

        // Another request may have redeemed the same token since the lookup.
        if !self.store.redeem_reset_token(&reset_token, &pw_hash).await? {
            return Err(AppError::NotFound("token not found".to_string()));
        }

        tracing::info!(user_id = %user.id, "Password reset via token");
        Ok(())
    }
}
