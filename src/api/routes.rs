//! API route configuration.

use crate::api::handlers::{redirect_handler, shorten_handler, stats_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Public routes of the service.
///
/// # Endpoints
///
/// - `POST /shorten`        - Create a short URL
/// - `GET  /{code}`         - Redirect to the stored url
/// - `GET  /{code}/stats`   - Usage statistics for a code
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/{code}", get(redirect_handler))
        .route("/{code}/stats", get(stats_handler))
}
