use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::models::{NewUser, User, UserChanges};
use crate::password;
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
}

pub async fn store(
    State(state): State<SharedState>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let email = validation::email(validation::required("email", req.email)?)?;
    let username = validation::username(validation::required("username", req.username)?)?;
    let plain = validation::password(validation::required("password", req.password)?)?;

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email already in use".to_string()));
    }
    if state.store.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("username already in use".to_string()));
    }

    let password_hash = password::hash(&plain).map_err(AppError::Internal)?;

    let user = state
        .store
        .create_user(NewUser {
            email,
            username,
            password_hash,
            avatar: req.avatar.filter(|a| !a.trim().is_empty()),
        })
        .await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    // A malformed id cannot name an account, so it is a miss like any other.
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("user not found".to_string()))?;

    let email = req.email.map(validation::email).transpose()?;
    let password_hash = match req.password {
        Some(plain) => {
            let plain = validation::password(plain)?;
            Some(password::hash(&plain).map_err(AppError::Internal)?)
        }
        None => None,
    };

    if let Some(email) = &email {
        if let Some(existing) = state.store.find_user_by_email(email).await? {
            if existing.id != id {
                return Err(AppError::Conflict("email already in use".to_string()));
            }
        }
    }

    let user = state
        .store
        .update_user(
            id,
            UserChanges {
                email,
                password_hash,
                avatar: req.avatar,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    tracing::info!(user_id = %user.id, "User updated");

    Ok(Json(UserResponse { user }))
}
