use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("authorization token missing")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("principal not found")]
    PrincipalNotFound,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_token(detail: impl Into<String>) -> Self {
        Self::InvalidToken(detail.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::InvalidToken(_) | AppError::PrincipalNotFound => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingToken => "missing_token",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::PrincipalNotFound => "principal_not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Validation(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Configuration(_) => "configuration",
            AppError::Database(_) => "store_error",
            AppError::Internal(_) => "internal",
        }
    }

    /// Message safe to hand to an untrusted client.
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidToken(_) => "invalid or expired token".to_string(),
            AppError::Database(_) | AppError::Internal(_) | AppError::Configuration(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// True when two concurrent writers raced on a UNIQUE column.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Database(_) | AppError::Internal(_) | AppError::Configuration(_) => {
                tracing::error!(error = %self, "request failed");
            }
            AppError::InvalidToken(detail) => {
                tracing::debug!(detail = %detail, "token rejected");
            }
            _ => {}
        }

        let payload = ErrorResponse {
            success: false,
            error: self.code(),
            message: self.public_message(),
        };

        (status, Json(payload)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        messages.sort();

        Self::Validation(messages.join(", "))
    }
}
