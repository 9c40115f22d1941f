use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRecoveryRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub reset_password_url: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn password_recovery(
    State(state): State<SharedState>,
    AppJson(req): AppJson<PasswordRecoveryRequest>,
) -> Result<StatusCode, AppError> {
    let email = validation::email(validation::required("email", req.email)?)?;
    let reset_password_url = validation::required("resetPasswordUrl", req.reset_password_url)?;

    state
        .recovery
        .request_reset(&email, reset_password_url.trim())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_password(
    State(state): State<SharedState>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    let token = validation::required("token", req.token)?;
    let password = validation::password(validation::required("password", req.password)?)?;

    state.recovery.reset_password(&token, &password).await?;

    Ok(StatusCode::NO_CONTENT)
}
