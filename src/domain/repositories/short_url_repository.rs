//! Repository trait for short URL records.

use crate::domain::entities::{RedirectCount, ShortUrl};
use crate::error::AppError;
use async_trait::async_trait;

/// Result of a conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The stored record was replaced.
    Updated,
    /// No record exists under the code.
    NotFound,
    /// The stored redirect count no longer matches what the caller read.
    Stale,
}

/// Keyed storage for short URL records.
///
/// Short codes are case-sensitive primary keys. The store is the single
/// place where uniqueness is enforced.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryShortUrlRepository`] - process memory
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Returns every stored record in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list_all(&self) -> Result<Vec<ShortUrl>, AppError>;

    /// Finds a record by exact short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Persists a new record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already stored.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, record: ShortUrl) -> Result<ShortUrl, AppError>;

    /// Replaces the mutable fields of the record stored under `code`.
    ///
    /// The write only happens while the stored redirect count still equals
    /// `expected`, so two writers that read the same record cannot both
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update_by_code(
        &self,
        code: &str,
        expected: RedirectCount,
        record: ShortUrl,
    ) -> Result<UpdateOutcome, AppError>;
}
