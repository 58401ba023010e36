//! Translation between stored records and their outward representation.
//!
//! Pure functions only; validation belongs to the service.

use chrono::{DateTime, Utc};

use crate::domain::entities::ShortUrl;

/// Outward view of a short URL record.
///
/// Exposes the redirect count as a plain number and renames the timestamps
/// to what clients see: `start_date` and `last_seen_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortUrlDto {
    pub short_code: String,
    pub url: String,
    pub start_date: DateTime<Utc>,
    pub last_seen_date: Option<DateTime<Utc>>,
    pub redirect_count: i64,
}

impl From<&ShortUrl> for ShortUrlDto {
    fn from(record: &ShortUrl) -> Self {
        Self {
            short_code: record.short_code.clone(),
            url: record.url.clone(),
            start_date: record.created_on,
            last_seen_date: record.updated_on,
            redirect_count: record.redirect_count.get(),
        }
    }
}

impl From<ShortUrl> for ShortUrlDto {
    fn from(record: ShortUrl) -> Self {
        Self {
            redirect_count: record.redirect_count.get(),
            short_code: record.short_code,
            url: record.url,
            start_date: record.created_on,
            last_seen_date: record.updated_on,
        }
    }
}

impl From<&ShortUrlDto> for ShortUrl {
    fn from(dto: &ShortUrlDto) -> Self {
        ShortUrl::restore(
            dto.short_code.clone(),
            dto.url.clone(),
            dto.start_date,
            dto.last_seen_date,
            dto.redirect_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fresh_record_maps_to_empty_stats() {
        let record = ShortUrl::new("example".to_string(), "www.example.com".to_string());
        let dto = ShortUrlDto::from(&record);

        assert_eq!(dto.short_code, "example");
        assert_eq!(dto.url, "www.example.com");
        assert_eq!(dto.start_date, record.created_on);
        assert!(dto.last_seen_date.is_none());
        assert_eq!(dto.redirect_count, 0);
    }

    #[test]
    fn test_last_seen_keeps_full_timestamp() {
        let created = Utc::now() - Duration::hours(3);
        let seen = created + Duration::minutes(90) + Duration::milliseconds(250);
        let record = ShortUrl::created_at("abcd".to_string(), "www.a.com".to_string(), created)
            .apply_redirect(seen);

        let dto = ShortUrlDto::from(record);

        assert_eq!(dto.last_seen_date, Some(seen));
        assert_eq!(dto.redirect_count, 1);
    }

    #[test]
    fn test_dto_back_to_record() {
        let created = Utc::now();
        let dto = ShortUrlDto {
            short_code: "Example".to_string(),
            url: "www.youtube.com".to_string(),
            start_date: created,
            last_seen_date: None,
            redirect_count: 3,
        };

        let record = ShortUrl::from(&dto);

        assert_eq!(record.short_code, "Example");
        assert_eq!(record.created_on, created);
        assert_eq!(record.redirect_count.get(), 3);
    }
}
