//! Short URL entity and its redirect-accounting state transition.

use chrono::{DateTime, Utc};

/// Number of redirects served for a short code.
///
/// # Panics
///
/// Constructing a negative count panics. Negative counts are a programming
/// error, never a user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RedirectCount(i64);

impl RedirectCount {
    pub fn new(value: i64) -> Self {
        assert!(value >= 0, "redirect count cannot be negative, got {value}");
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    fn incremented(self) -> Self {
        Self::new(self.0 + 1)
    }
}

/// A stored mapping from a short code to its destination URL.
///
/// Records are created once with a zero redirect count and no `updated_on`,
/// then only ever advanced through [`ShortUrl::apply_redirect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortUrl {
    pub short_code: String,
    pub url: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
    pub redirect_count: RedirectCount,
}

impl ShortUrl {
    /// Creates a fresh record stamped with the current time.
    pub fn new(short_code: String, url: String) -> Self {
        Self::created_at(short_code, url, Utc::now())
    }

    /// Creates a fresh record with an explicit creation time.
    pub fn created_at(short_code: String, url: String, created_on: DateTime<Utc>) -> Self {
        Self {
            short_code,
            url,
            created_on,
            updated_on: None,
            redirect_count: RedirectCount::default(),
        }
    }

    /// Rebuilds a record from persisted fields.
    pub fn restore(
        short_code: String,
        url: String,
        created_on: DateTime<Utc>,
        updated_on: Option<DateTime<Utc>>,
        redirect_count: i64,
    ) -> Self {
        Self {
            short_code,
            url,
            created_on,
            updated_on,
            redirect_count: RedirectCount::new(redirect_count),
        }
    }

    /// Returns the record as it looks after one more redirect at `now`.
    ///
    /// Count and last-seen time always move together.
    pub fn apply_redirect(&self, now: DateTime<Utc>) -> Self {
        Self {
            redirect_count: self.redirect_count.incremented(),
            updated_on: Some(now),
            ..self.clone()
        }
    }
}

/// Input for creating a short URL.
///
/// Both fields are optional at this level; the service decides what a
/// missing value means.
#[derive(Debug, Clone, Default)]
pub struct NewShortUrl {
    pub url: Option<String>,
    pub short_code: Option<String>,
}
