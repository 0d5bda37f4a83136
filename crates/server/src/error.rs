use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ids_lib::ValidationError;
use serde_json::json;

/// Error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The report decoded but failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The body was not a JSON object of the expected shape.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
