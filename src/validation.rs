use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles")
});

pub const MIN_PASSWORD_LEN: usize = 4;

/// Unwrap a field that must be present and not blank.
pub fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

pub fn email(value: String) -> Result<String, AppError> {
    let value = value.trim().to_string();
    if EMAIL_RE.is_match(&value) {
        Ok(value)
    } else {
        Err(AppError::Validation("email must be a valid email address".to_string()))
    }
}

pub fn password(value: String) -> Result<String, AppError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(value)
}

pub fn username(value: String) -> Result<String, AppError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    Ok(value)
}
