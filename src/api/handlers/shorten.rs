//! Handler for the link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::json::Utf8Json;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL, optionally under a suggested code.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "shortCode": "example"   // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `Location: /{shortCode}/stats`:
///
/// ```json
/// {
///   "shortCode": "example",
///   "url": null,
///   "createdOn": "2024-06-01T10:00:00Z",
///   "updatedOn": null,
///   "redirectCount": 0
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the url is missing or the body is not valid JSON
/// - 409 Conflict if the code is already in use
/// - 422 Unprocessable Entity if the suggested code is malformed
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;

    let created = state.short_url_service.create(request.into()).await?;
    let location = format!("/{}/stats", created.short_code);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Utf8Json(ShortenResponse::from(created)),
    ))
}
