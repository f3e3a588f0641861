//! Cow detection endpoint.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::debug;

use herdwatch_detect::count_cows;
use herdwatch_models::CountSummary;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field name carrying the uploaded image.
const IMAGE_FIELD: &str = "image";

/// `POST /detect_cows`: count cows and their postures in one uploaded
/// image.
///
/// Expects a multipart form with a single `image` field. A missing
/// field is a 400 before the detector is ever invoked; decode failures
/// likewise. Inference runs on the blocking pool since the pipeline is
/// synchronous CPU work.
pub async fn detect_cows(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<CountSummary>> {
    debug!("Detection endpoint hit, reading multipart upload");

    let mut image_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::MissingImage)?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field.bytes().await.map_err(|_| ApiError::MissingImage)?;
            image_bytes = Some(bytes);
            break;
        }
    }

    let bytes = image_bytes.ok_or(ApiError::MissingImage)?;

    let detector = Arc::clone(&state.detector);
    let params = state.inference_params;
    let summary = tokio::task::spawn_blocking(move || count_cows(detector.as_ref(), &bytes, &params))
        .await
        .map_err(|e| ApiError::internal(format!("Inference task failed: {}", e)))??;

    Ok(Json(summary))
}
