//! JSON response wrapper with an explicit UTF-8 charset.

use axum::{
    Json,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Content type sent with every JSON body.
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Like [`axum::Json`], but advertises `application/json; charset=utf-8`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Json<T>(pub T);

impl<T: Serialize> IntoResponse for Utf8Json<T> {
    fn into_response(self) -> Response {
        let mut response = Json(self.0).into_response();

        // Serialization failures come back as plain text and stay that way.
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));

        if is_json {
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_UTF8),
            );
        }

        response
    }
}
