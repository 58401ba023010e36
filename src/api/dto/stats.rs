//! DTOs for short code statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::mapper::ShortUrlDto;

/// Usage statistics for one short code.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub start_date: DateTime<Utc>,
    pub last_seen_date: Option<DateTime<Utc>>,
    pub redirect_count: i64,
}

impl From<ShortUrlDto> for StatsResponse {
    fn from(dto: ShortUrlDto) -> Self {
        Self {
            start_date: dto.start_date,
            last_seen_date: dto.last_seen_date,
            redirect_count: dto.redirect_count,
        }
    }
}
