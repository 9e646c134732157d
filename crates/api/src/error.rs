use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stylemark_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `stylemark_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The session registry is full.
    #[error("Session limit of {0} reached")]
    TooManySessions(usize),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::MissingField(_) | CoreError::InvalidEnum { .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", core.to_string())
                }
                CoreError::OutOfRange { .. } => {
                    (StatusCode::BAD_REQUEST, "OUT_OF_RANGE", core.to_string())
                }
                CoreError::SchemaMismatch { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "SCHEMA_MISMATCH",
                    core.to_string(),
                ),
                CoreError::Source(msg) => {
                    tracing::warn!(error = %msg, "Image source error");
                    (StatusCode::BAD_GATEWAY, "SOURCE_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::TooManySessions(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "TOO_MANY_SESSIONS",
                self.to_string(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let AppError::Core(core) = &self {
            if let Some(field) = core.field() {
                body["field"] = json!(field);
            }
        }

        (status, axum::Json(body)).into_response()
    }
}
