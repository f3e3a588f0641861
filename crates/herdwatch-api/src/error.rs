//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use herdwatch_detect::DetectError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The multipart request carried no image field.
    #[error("No image data received")]
    MissingImage,

    /// The image field was present but could not be decoded.
    #[error("Failed to decode image")]
    DecodeFailed,

    /// The detector failed during inference.
    #[error("Detection failed: {0}")]
    Detect(DetectError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::DecodeFailed => StatusCode::BAD_REQUEST,
            ApiError::Detect(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DetectError> for ApiError {
    fn from(err: DetectError) -> Self {
        if err.is_client_error() {
            ApiError::DecodeFailed
        } else {
            ApiError::Detect(err)
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side failures are logged with detail but surfaced to
        // the caller as a uniform generic message.
        let error = match &self {
            ApiError::MissingImage | ApiError::DecodeFailed => self.to_string(),
            ApiError::Detect(_) | ApiError::Internal(_) => {
                error!(detail = %self, "Request failed with server error");
                "An error occurred on the server".to_string()
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
