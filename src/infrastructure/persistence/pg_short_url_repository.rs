//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{RedirectCount, ShortUrl};
use crate::domain::repositories::{ShortUrlRepository, UpdateOutcome};
use crate::error::AppError;

/// Row shape of the `short_urls` table.
#[derive(Debug, sqlx::FromRow)]
struct ShortUrlRow {
    short_code: String,
    url: String,
    created_on: DateTime<Utc>,
    updated_on: Option<DateTime<Utc>>,
    redirect_count: i64,
}

impl From<ShortUrlRow> for ShortUrl {
    fn from(row: ShortUrlRow) -> Self {
        ShortUrl::restore(
            row.short_code,
            row.url,
            row.created_on,
            row.updated_on,
            row.redirect_count,
        )
    }
}

/// PostgreSQL repository for short URL records.
///
/// The primary key on `short_code` enforces uniqueness; `TEXT` comparison
/// keeps codes case-sensitive.
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn list_all(&self) -> Result<Vec<ShortUrl>, AppError> {
        let rows = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            SELECT short_code, url, created_on, updated_on, redirect_count
            FROM short_urls
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ShortUrl::from).collect())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            SELECT short_code, url, created_on, updated_on, redirect_count
            FROM short_urls
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortUrl::from))
    }

    async fn insert(&self, record: ShortUrl) -> Result<ShortUrl, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            INSERT INTO short_urls (short_code, url, created_on, updated_on, redirect_count)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING short_code, url, created_on, updated_on, redirect_count
            "#,
        )
        .bind(&record.short_code)
        .bind(&record.url)
        .bind(record.created_on)
        .bind(record.updated_on)
        .bind(record.redirect_count.get())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn update_by_code(
        &self,
        code: &str,
        expected: RedirectCount,
        record: ShortUrl,
    ) -> Result<UpdateOutcome, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET updated_on = $2, redirect_count = $3
            WHERE short_code = $1 AND redirect_count = $4
            "#,
        )
        .bind(code)
        .bind(record.updated_on)
        .bind(record.redirect_count.get())
        .bind(expected.get())
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() > 0 {
            return Ok(UpdateOutcome::Updated);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM short_urls WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(if exists {
            UpdateOutcome::Stale
        } else {
            UpdateOutcome::NotFound
        })
    }
}
