//! Error types
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::settings::ConfigError;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Access denied (403)
    #[error("Access denied")]
    Forbidden,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Option or profile field rejected by the registry
    #[error(transparent)]
    Settings(#[from] ConfigError),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::Settings(err) => {
                let status = match err {
                    ConfigError::UnknownOption(_) => StatusCode::NOT_FOUND,
                    ConfigError::TypeMismatch { .. }
                    | ConfigError::ValueNotAllowed { .. }
                    | ConfigError::ListFull { .. }
                    | ConfigError::TooManyFields { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ConfigError::DuplicateOption(_)
                    | ConfigError::InvalidDefault { .. }
                    | ConfigError::RegistryFrozen(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.kind())
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_type) = self.status_and_kind();
        let error_message = match &self {
            AppError::Database(_) => "Database error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Validation(msg) | AppError::Config(msg) => msg.clone(),
            _ => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, kind = error_type, "Request failed");
        }

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
            "kind": error_type,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
