//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::ShortUrlService;
use crate::domain::repositories::ShortUrlRepository;

/// Service type used by the HTTP layer, independent of the store backend.
pub type SharedShortUrlService = Arc<ShortUrlService<dyn ShortUrlRepository>>;

#[derive(Clone)]
pub struct AppState {
    pub short_url_service: SharedShortUrlService,
}

impl AppState {
    pub fn new(short_url_service: SharedShortUrlService) -> Self {
        Self { short_url_service }
    }
}
