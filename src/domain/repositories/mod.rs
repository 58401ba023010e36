//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for service tests.
//!
//! # Available Repositories
//!
//! - [`ShortUrlRepository`] - Keyed storage of short URL records

pub mod short_url_repository;

pub use short_url_repository::{ShortUrlRepository, UpdateOutcome};

#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
