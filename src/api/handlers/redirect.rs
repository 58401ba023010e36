//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination and counts the visit.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Response
///
/// `302 Found` with `Location` set to the stored url and an empty body.
/// The redirect count is updated before the response is sent, so a
/// following stats request already sees it.
///
/// # Errors
///
/// - 404 Not Found if the short code doesn't exist
/// - 500 Internal Server Error if the stored url is not a valid header value
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let record = state.short_url_service.record_redirect(&code).await?;

    let location = HeaderValue::from_str(&record.url).map_err(|_| {
        AppError::internal(format!("Stored url for {} is not a valid Location header", code))
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
