//! Handler for short code statistics.

use axum::extract::{Path, State};

use crate::api::dto::stats::StatsResponse;
use crate::api::json::Utf8Json;
use crate::error::AppError;
use crate::state::AppState;

/// Returns creation time, last redirect time, and redirect count.
///
/// # Endpoint
///
/// `GET /{code}/stats`
///
/// # Response
///
/// ```json
/// {
///   "startDate": "2024-06-01T10:00:00Z",
///   "lastSeenDate": null,
///   "redirectCount": 0
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Utf8Json<StatsResponse>, AppError> {
    let record = state
        .short_url_service
        .get_by_code(&code)
        .await?
        .ok_or_else(|| AppError::not_found(&code))?;

    Ok(Utf8Json(record.into()))
}
