use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::config::AppConfig;

/// Which credential failed a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Email,
    Password,
}

impl CredentialField {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialField::Email => "email",
            CredentialField::Password => "password",
        }
    }
}

/// One failed validation rule, `{"msg", "param"}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: &'static str,
    pub param: &'static str,
}

/// Every failure the API reports, with its fixed status and message key.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("error.user_exists")]
    UserExists,
    #[error("error.invalid_credentials")]
    InvalidCredentials(CredentialField),
    #[error("error.refresh_token_required")]
    RefreshTokenRequired,
    #[error("error.invalid_refresh_token")]
    InvalidRefreshToken,
    #[error("No token provided")]
    NoToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("User not found")]
    UserNotFound,
    #[error("error.invalid_date_format")]
    InvalidDateFormat,
    #[error("error.end_date_before_start")]
    EndDateBeforeStart,
    #[error("error.event_not_found")]
    EventNotFound,
    #[error("error.setting_not_found")]
    SettingNotFound,
    #[error("{key}")]
    Internal {
        key: &'static str,
        detail: Option<String>,
    },
}

impl ApiError {
    /// Wraps an unexpected failure under the operation's message key. The
    /// cause is logged here; the response carries it only in development.
    pub fn internal(key: &'static str, err: anyhow::Error, config: &AppConfig) -> Self {
        tracing::error!(error = %err, key, "internal error");
        let detail = config.env.is_development().then(|| err.to_string());
        ApiError::Internal { key, detail }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::UserExists
            | ApiError::InvalidDateFormat
            | ApiError::EndDateBeforeStart => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials(_)
            | ApiError::RefreshTokenRequired
            | ApiError::InvalidRefreshToken
            | ApiError::NoToken
            | ApiError::InvalidToken
            | ApiError::TokenExpired
            | ApiError::UserNotFound => StatusCode::UNAUTHORIZED,
            ApiError::EventNotFound | ApiError::SettingNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::Validation(errors) => json!({ "errors": errors }),
            ApiError::UserExists => json!({ "message": "error.user_exists", "field": "email" }),
            ApiError::InvalidCredentials(field) => {
                json!({ "message": "error.invalid_credentials", "field": field.as_str() })
            }
            ApiError::TokenExpired => {
                json!({ "message": "Token expired", "code": "TOKEN_EXPIRED" })
            }
            ApiError::Internal {
                key,
                detail: Some(detail),
            } => json!({ "message": key, "error": detail }),
            ApiError::Internal { key, detail: None } => json!({ "message": key }),
            other => json!({ "message": other.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
