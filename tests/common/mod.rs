#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use std::sync::Arc;
use shorty::api::routes::public_routes;
use shorty::application::services::ShortUrlService;
use shorty::domain::code_policy::CodeGenerator;
use shorty::domain::entities::ShortUrl;
use shorty::domain::repositories::ShortUrlRepository;
use shorty::infrastructure::persistence::InMemoryShortUrlRepository;
use shorty::state::AppState;

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Store holding `Example` -> `www.youtube.com` and `example` -> `www.example.com`.
pub fn seeded_repository() -> InMemoryShortUrlRepository {
    InMemoryShortUrlRepository::with_records([
        ShortUrl::new("Example".to_string(), "www.youtube.com".to_string()),
        ShortUrl::new("example".to_string(), "www.example.com".to_string()),
    ])
}

pub fn create_test_state(repository: Arc<dyn ShortUrlRepository>) -> AppState {
    let service = ShortUrlService::new(repository, CodeGenerator::seeded(2024, 6));
    AppState::new(Arc::new(service))
}

pub fn create_test_app(repository: Arc<dyn ShortUrlRepository>) -> Router {
    public_routes().with_state(create_test_state(repository))
}

pub fn create_test_server() -> TestServer {
    TestServer::new(create_test_app(Arc::new(seeded_repository()))).unwrap()
}
