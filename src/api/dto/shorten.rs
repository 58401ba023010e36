//! DTOs for the link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::mapper::ShortUrlDto;
use crate::domain::entities::NewShortUrl;

/// Body of `POST /shorten`.
///
/// Both fields are optional here so that a missing url reaches the service
/// and gets the proper error instead of a deserialization failure.
/// PascalCase keys are accepted as well.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    #[serde(alias = "Url")]
    pub url: Option<String>,
    #[serde(alias = "ShortCode")]
    pub short_code: Option<String>,
}

impl From<ShortenRequest> for NewShortUrl {
    fn from(request: ShortenRequest) -> Self {
        NewShortUrl {
            url: request.url,
            short_code: request.short_code,
        }
    }
}

/// Body returned after a successful creation.
///
/// The destination url is deliberately left out and always serialized as
/// `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_code: String,
    pub url: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
    pub redirect_count: i64,
}

impl From<ShortUrlDto> for ShortenResponse {
    fn from(dto: ShortUrlDto) -> Self {
        Self {
            short_code: dto.short_code,
            url: None,
            created_on: dto.start_date,
            updated_on: dto.last_seen_date,
            redirect_count: dto.redirect_count,
        }
    }
}
