//! Application error type and its HTTP rendering.
//!
//! Every domain failure is an [`AppError`]. Handlers return it directly and
//! axum turns it into a JSON body of the form:
//!
//! ```json
//! { "error": 404, "description": "The code abc cannot be found in the system" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::json::Utf8Json;
use crate::domain::code_policy::SHORT_CODE_PATTERN;

/// Serialized error payload shared by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: u16,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No record is stored under the requested short code.
    #[error("The code {code} cannot be found in the system")]
    NotFound { code: String },

    /// Required input is missing or malformed.
    #[error("{message}")]
    Validation { message: String },

    /// A user-suggested short code does not match the format rule.
    #[error("The shortcode fails to meet the following regexp: {pattern}.", pattern = SHORT_CODE_PATTERN)]
    UnprocessableCode,

    /// The short code is already taken.
    #[error("The the desired shortcode is already in use. Shortcodes are case-sensitive.")]
    Conflict,

    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound { code: code.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::UnprocessableCode => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the serializable body for this error.
    ///
    /// Internal failure details stay in the logs and never reach the client.
    pub fn to_error_body(&self) -> ErrorBody {
        let description = match self {
            AppError::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };

        ErrorBody {
            error: self.status_code().as_u16(),
            description,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal { message } = &self {
            tracing::error!("Internal error: {}", message);
        }

        (self.status_code(), Utf8Json(self.to_error_body())).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::Conflict;
        }

        AppError::internal(format!("Database error: {}", e))
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}
