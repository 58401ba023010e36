//! Short URL creation, lookup, and redirect accounting.

use std::sync::Arc;

use axum::http::HeaderValue;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::application::mapper::ShortUrlDto;
use crate::domain::code_policy::{CodeGenerator, is_valid_code};
use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::{ShortUrlRepository, UpdateOutcome};
use crate::error::AppError;

/// Default number of fresh codes tried before giving up on a collision.
pub const DEFAULT_GENERATION_ATTEMPTS: usize = 10;

/// Upper bound on re-reads when a concurrent redirect wins the update race.
const MAX_UPDATE_ATTEMPTS: usize = 64;

/// Service for creating short URLs and keeping their redirect statistics.
///
/// Generic over the record store so it runs against PostgreSQL in
/// production, an in-memory map in tests, or a mock in unit tests.
pub struct ShortUrlService<R: ShortUrlRepository + ?Sized> {
    repository: Arc<R>,
    generator: CodeGenerator,
    generation_attempts: usize,
}

impl<R: ShortUrlRepository + ?Sized> ShortUrlService<R> {
    /// Creates a new service.
    pub fn new(repository: Arc<R>, generator: CodeGenerator) -> Self {
        Self {
            repository,
            generator,
            generation_attempts: DEFAULT_GENERATION_ATTEMPTS,
        }
    }

    /// Sets how many generated codes are tried before reporting a conflict.
    pub fn with_generation_attempts(mut self, attempts: usize) -> Self {
        self.generation_attempts = attempts.max(1);
        self
    }

    /// Looks up a short code without touching its statistics.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(dto))` if the code is stored
    /// - `Ok(None)` if it is not
    pub async fn get_by_code(&self, code: &str) -> Result<Option<ShortUrlDto>, AppError> {
        debug!("Looking up short code {}", code);

        Ok(self
            .repository
            .find_by_code(code)
            .await?
            .map(ShortUrlDto::from))
    }

    /// Lists every stored short URL.
    pub async fn list_all(&self) -> Result<Vec<ShortUrlDto>, AppError> {
        Ok(self
            .repository
            .list_all()
            .await?
            .into_iter()
            .map(ShortUrlDto::from)
            .collect())
    }

    /// Creates a short URL.
    ///
    /// A suggested code must match the format rule. Without one, a random
    /// code is generated and retried on collision up to the configured
    /// number of attempts. An empty suggested code counts as no suggestion.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the url is missing, empty, or cannot be
    ///   sent as a `Location` header
    /// - [`AppError::UnprocessableCode`] if the suggested code is malformed
    /// - [`AppError::Conflict`] if the code is taken, or every generated
    ///   code collided
    pub async fn create(&self, request: NewShortUrl) -> Result<ShortUrlDto, AppError> {
        let url = request
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("url is not present"))?;

        if !is_redirect_target(&url) {
            debug!("Rejected url that is not a valid header value");
            return Err(AppError::bad_request("url is not a valid redirect target"));
        }

        let record = match request.short_code.filter(|code| !code.is_empty()) {
            Some(code) => {
                if !is_valid_code(&code) {
                    debug!("Rejected malformed short code {:?}", code);
                    return Err(AppError::UnprocessableCode);
                }

                self.repository
                    .insert(ShortUrl::new(code.clone(), url))
                    .await
                    .inspect_err(|e| {
                        if matches!(e, AppError::Conflict) {
                            warn!("Short code {} is already in use", code);
                        }
                    })?
            }
            None => self.insert_with_generated_code(url).await?,
        };

        info!("Created short code {} -> {}", record.short_code, record.url);

        Ok(ShortUrlDto::from(record))
    }

    /// Counts one redirect for `code` and returns the updated record.
    ///
    /// The count and last-seen time advance together. If another redirect
    /// for the same code lands between the read and the write, the record
    /// is read again so no increment is lost.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is not stored
    /// - [`AppError::Internal`] if the stored url cannot be redirected to, or
    ///   the update keeps losing to concurrent writers
    pub async fn record_redirect(&self, code: &str) -> Result<ShortUrlDto, AppError> {
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let current = self
                .repository
                .find_by_code(code)
                .await?
                .ok_or_else(|| AppError::not_found(code))?;

            if !is_redirect_target(&current.url) {
                return Err(AppError::internal(format!(
                    "Stored url for {} is not a valid Location header",
                    code
                )));
            }

            let updated = current.apply_redirect(Utc::now());

            match self
                .repository
                .update_by_code(code, current.redirect_count, updated.clone())
                .await?
            {
                UpdateOutcome::Updated => {
                    debug!(
                        "Redirect #{} recorded for {}",
                        updated.redirect_count.get(),
                        code
                    );
                    return Ok(ShortUrlDto::from(updated));
                }
                UpdateOutcome::NotFound => return Err(AppError::not_found(code)),
                UpdateOutcome::Stale => {
                    debug!("Concurrent redirect on {}, retrying", code);
                }
            }
        }

        Err(AppError::internal(format!(
            "Failed to record redirect for {} after {} attempts",
            code, MAX_UPDATE_ATTEMPTS
        )))
    }

    /// Generates a code with the service's random source.
    pub fn generate_random_code(&self) -> String {
        self.generator.generate()
    }

    /// Inserts `url` under freshly generated codes until one is free.
    async fn insert_with_generated_code(&self, url: String) -> Result<ShortUrl, AppError> {
        for _ in 0..self.generation_attempts {
            let code = self.generator.generate();

            match self.repository.insert(ShortUrl::new(code, url.clone())).await {
                Ok(record) => return Ok(record),
                Err(AppError::Conflict) => {
                    debug!("Generated code collided, drawing another");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            "Gave up generating a short code after {} collisions",
            self.generation_attempts
        );
        Err(AppError::Conflict)
    }
}

/// A redirect target must be representable as a `Location` header value.
fn is_redirect_target(url: &str) -> bool {
    HeaderValue::from_str(url).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RedirectCount;
    use crate::domain::repositories::MockShortUrlRepository;
    use mockall::Sequence;

    fn service(repo: MockShortUrlRepository) -> ShortUrlService<MockShortUrlRepository> {
        ShortUrlService::new(Arc::new(repo), CodeGenerator::seeded(42, 6))
    }

    fn request(url: Option<&str>, code: Option<&str>) -> NewShortUrl {
        NewShortUrl {
            url: url.map(str::to_string),
            short_code: code.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_with_suggested_code() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert()
            .withf(|record| {
                record.short_code == "example_one"
                    && record.url == "www.example_one.com"
                    && record.redirect_count.get() == 0
                    && record.updated_on.is_none()
            })
            .times(1)
            .returning(Ok);

        let dto = service(repo)
            .create(request(Some("www.example_one.com"), Some("example_one")))
            .await
            .unwrap();

        assert_eq!(dto.short_code, "example_one");
        assert_eq!(dto.redirect_count, 0);
        assert!(dto.last_seen_date.is_none());
    }

    #[tokio::test]
    async fn test_create_generates_code_when_absent() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert().times(1).returning(Ok);

        let dto = service(repo)
            .create(request(Some("www.example.com"), None))
            .await
            .unwrap();

        assert_eq!(dto.short_code.len(), 6);
        assert!(dto.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_create_treats_empty_code_as_absent() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert()
            .withf(|record| record.short_code.len() == 6)
            .times(1)
            .returning(Ok);

        let result = service(repo)
            .create(request(Some("www.example.com"), Some("")))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_missing_url() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert().times(0);

        let result = service(repo).create(request(None, Some("abcd"))).await;

        match result {
            Err(AppError::Validation { message }) => assert_eq!(message, "url is not present"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_blank_url() {
        let repo = MockShortUrlRepository::new();

        let result = service(repo).create(request(Some("   "), None)).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_rejects_control_characters_in_url() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert().times(0);

        let result = service(repo)
            .create(request(Some("www.a.com\nX-Injected: 1"), Some("ctrl_url")))
            .await;

        match result {
            Err(AppError::Validation { message }) => {
                assert_eq!(message, "url is not a valid redirect target")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_malformed_code() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert().times(0);

        let result = service(repo)
            .create(request(Some("www.youtube.com"), Some("e")))
            .await;

        assert!(matches!(result, Err(AppError::UnprocessableCode)));
    }

    #[tokio::test]
    async fn test_create_suggested_code_conflict() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert()
            .withf(|record| record.short_code == "Example")
            .times(1)
            .returning(|_| Err(AppError::Conflict));

        let result = service(repo)
            .create(request(Some("www.youtube.com"), Some("Example")))
            .await;

        assert!(matches!(result, Err(AppError::Conflict)));
    }

    #[tokio::test]
    async fn test_generated_code_retries_on_collision() {
        let mut repo = MockShortUrlRepository::new();
        let mut seq = Sequence::new();
        repo.expect_insert()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::Conflict));
        repo.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(Ok);

        let result = service(repo)
            .create(request(Some("www.example.com"), None))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_generated_code_gives_up_after_attempts() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert()
            .times(3)
            .returning(|_| Err(AppError::Conflict));

        let result = service(repo)
            .with_generation_attempts(3)
            .create(request(Some("www.example.com"), None))
            .await;

        assert!(matches!(result, Err(AppError::Conflict)));
    }

    #[tokio::test]
    async fn test_generated_code_propagates_storage_error() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::internal("boom")));

        let result = service(repo)
            .create(request(Some("www.example.com"), None))
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_get_by_code_found() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "example")
            .times(1)
            .returning(|_| {
                Ok(Some(ShortUrl::new(
                    "example".to_string(),
                    "www.example.com".to_string(),
                )))
            });

        let dto = service(repo).get_by_code("example").await.unwrap().unwrap();

        assert_eq!(dto.url, "www.example.com");
        assert_eq!(dto.redirect_count, 0);
    }

    #[tokio::test]
    async fn test_get_by_code_absent() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_code().returning(|_| Ok(None));

        let result = service(repo).get_by_code("unknown").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_all_maps_every_record() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_list_all().times(1).returning(|| {
            Ok(vec![
                ShortUrl::new("Example".to_string(), "www.youtube.com".to_string()),
                ShortUrl::new("example".to_string(), "www.example.com".to_string()),
            ])
        });

        let all = service(repo).list_all().await.unwrap();

        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_record_redirect_increments_once() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| {
            Ok(Some(ShortUrl::new(
                "example".to_string(),
                "www.example.com".to_string(),
            )))
        });
        repo.expect_update_by_code()
            .withf(|code, expected, record| {
                code == "example"
                    && *expected == RedirectCount::new(0)
                    && record.redirect_count.get() == 1
                    && record.updated_on.is_some()
            })
            .times(1)
            .returning(|_, _, _| Ok(UpdateOutcome::Updated));

        let dto = service(repo).record_redirect("example").await.unwrap();

        assert_eq!(dto.redirect_count, 1);
        assert!(dto.last_seen_date.is_some());
        assert_eq!(dto.url, "www.example.com");
    }

    #[tokio::test]
    async fn test_record_redirect_unknown_code() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_code().returning(|_| Ok(None));
        repo.expect_update_by_code().times(0);

        let result = service(repo).record_redirect("unknown").await;

        match result {
            Err(AppError::NotFound { code }) => assert_eq!(code, "unknown"),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_record_redirect_rereads_after_stale_update() {
        let mut repo = MockShortUrlRepository::new();
        let mut seq = Sequence::new();

        repo.expect_find_by_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(ShortUrl::new("abcd".to_string(), "www.a.com".to_string()))));
        repo.expect_update_by_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(UpdateOutcome::Stale));
        repo.expect_find_by_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(Some(
                    ShortUrl::new("abcd".to_string(), "www.a.com".to_string())
                        .apply_redirect(Utc::now()),
                ))
            });
        repo.expect_update_by_code()
            .withf(|_, expected, record| {
                *expected == RedirectCount::new(1) && record.redirect_count.get() == 2
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(UpdateOutcome::Updated));

        let dto = service(repo).record_redirect("abcd").await.unwrap();

        assert_eq!(dto.redirect_count, 2);
    }

    #[tokio::test]
    async fn test_record_redirect_record_vanished() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_code()
            .returning(|_| Ok(Some(ShortUrl::new("abcd".to_string(), "www.a.com".to_string()))));
        repo.expect_update_by_code()
            .returning(|_, _, _| Ok(UpdateOutcome::NotFound));

        let result = service(repo).record_redirect("abcd").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_record_redirect_gives_up_when_always_stale() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_code()
            .times(MAX_UPDATE_ATTEMPTS)
            .returning(|_| Ok(Some(ShortUrl::new("busy".to_string(), "www.a.com".to_string()))));
        repo.expect_update_by_code()
            .times(MAX_UPDATE_ATTEMPTS)
            .returning(|_, _, _| Ok(UpdateOutcome::Stale));

        let result = service(repo).record_redirect("busy").await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_record_redirect_leaves_unusable_url_uncounted() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| {
            Ok(Some(ShortUrl::new(
                "legacy".to_string(),
                "www.a.com\r\nX-Injected: 1".to_string(),
            )))
        });
        repo.expect_update_by_code().times(0);

        let result = service(repo).record_redirect("legacy").await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[test]
    fn test_generate_random_code_uses_configured_length() {
        let repo = MockShortUrlRepository::new();
        let service = ShortUrlService::new(Arc::new(repo), CodeGenerator::seeded(1, 9));

        assert_eq!(service.generate_random_code().len(), 9);
    }
}
