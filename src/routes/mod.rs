pub mod passwords;
pub mod users;

use axum::routing::{post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Users
        .route("/users", post(users::store))
        .route("/users/{id}", put(users::update))
        // Password recovery
        .route("/password-recovery", post(passwords::password_recovery))
        .route("/reset-password", post(passwords::reset_password))
}
