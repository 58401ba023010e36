//! In-memory implementation of the short URL repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{RedirectCount, ShortUrl};
use crate::domain::repositories::{ShortUrlRepository, UpdateOutcome};
use crate::error::AppError;

/// Process-local record store backed by a [`DashMap`].
///
/// Each key is guarded by its shard lock, so the existence check in
/// `insert` and the count check in `update_by_code` are atomic with the
/// write that follows. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryShortUrlRepository {
    records: DashMap<String, ShortUrl>,
}

impl InMemoryShortUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `records`. Later duplicates win.
    pub fn with_records(records: impl IntoIterator<Item = ShortUrl>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.insert(record.short_code.clone(), record);
        }
        store
    }
}

#[cfg(test)]
impl InMemoryShortUrlRepository {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ShortUrlRepository for InMemoryShortUrlRepository {
    async fn list_all(&self) -> Result<Vec<ShortUrl>, AppError> {
        Ok(self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        Ok(self.records.get(code).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, record: ShortUrl) -> Result<ShortUrl, AppError> {
        match self.records.entry(record.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update_by_code(
        &self,
        code: &str,
        expected: RedirectCount,
        record: ShortUrl,
    ) -> Result<UpdateOutcome, AppError> {
        let Some(mut stored) = self.records.get_mut(code) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if stored.redirect_count != expected {
            return Ok(UpdateOutcome::Stale);
        }

        stored.updated_on = record.updated_on;
        stored.redirect_count = record.redirect_count;

        Ok(UpdateOutcome::Updated)
    }
}
