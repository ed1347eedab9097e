/*
 * Responsibility
 * - アプリ共通の AppError 定義 (HTTP boundary)
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - auth / signing / config / user directory の error を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;
use crate::services::auth::password::PasswordError;
use crate::services::auth::{AuthError, SigningError};
use crate::services::users::UserDirectoryError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("{message}")]
    Forbidden { code: &'static str, message: String },

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::Conflict { code, .. } => *code,
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        if e.is_forbidden() {
            AppError::Forbidden {
                code: e.code(),
                message: e.to_string(),
            }
        } else {
            AppError::Unauthorized {
                code: e.code(),
                message: e.to_string(),
            }
        }
    }
}

impl From<SigningError> for AppError {
    fn from(e: SigningError) -> Self {
        error!(error = %e, "token issuance failed");
        AppError::Internal
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        error!(error = %e, "configuration error");
        AppError::Internal
    }
}

impl From<UserDirectoryError> for AppError {
    fn from(e: UserDirectoryError) -> Self {
        match e {
            UserDirectoryError::AlreadyExists => {
                AppError::conflict("EMAIL_ALREADY_EXISTS", "email already exists")
            }
            UserDirectoryError::NotFound => AppError::not_found("user"),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Weak(reason) => {
                AppError::bad_request("WEAK_PASSWORD", format!("password {reason}"))
            }
            PasswordError::Hash | PasswordError::InvalidHash => {
                error!(error = %e, "password hashing failed");
                AppError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn auth_errors_are_401_with_wire_code() {
        let (status, body) = body_json(AuthError::TokenExpired.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_TOKEN_EXPIRED");
        assert_eq!(body["error"]["message"], "token has expired");
    }

    #[tokio::test]
    async fn insufficient_permission_is_403() {
        let (status, body) = body_json(AuthError::InsufficientPermission.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "AUTH_INSUFFICIENT_PERMISSION");
    }

    #[tokio::test]
    async fn signing_failure_is_a_server_error() {
        let (status, body) = body_json(SigningError::EmptySubject.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
    }

    #[tokio::test]
    async fn duplicate_user_is_409() {
        let (status, body) = body_json(UserDirectoryError::AlreadyExists.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "EMAIL_ALREADY_EXISTS");
    }
}
