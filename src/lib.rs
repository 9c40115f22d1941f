pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod extract;
pub mod models;
pub mod password;
pub mod recovery;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::{LogMailer, Mailer, SmtpMailer};
use crate::recovery::{PasswordRecovery, RecoverySettings};
use crate::state::{AppState, SharedState};
use crate::store::SharedStore;

/// Pick the SMTP mailer when configured, falling back to logging messages.
pub fn system_mailer(config: &Config) -> Arc<dyn Mailer> {
    match config.smtp.as_ref().map(SmtpMailer::new) {
        Some(Ok(mailer)) => {
            tracing::info!("SMTP configured");
            Arc::new(mailer)
        }
        Some(Err(e)) => {
            tracing::warn!("SMTP not available: {e}");
            Arc::new(LogMailer)
        }
        None => {
            tracing::warn!("SMTP not configured, emails will be logged");
            Arc::new(LogMailer)
        }
    }
}

pub fn build_app(store: SharedStore, mailer: Arc<dyn Mailer>, config: Config) -> Router {
    let recovery = PasswordRecovery::new(
        store.clone(),
        mailer,
        RecoverySettings::from_config(&config),
    );

    let state: SharedState = Arc::new(AppState { store, recovery });

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
