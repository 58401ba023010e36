//! Application layer implementing the use cases.
//!
//! Services coordinate the code policy and the record store, and hand
//! results out through the mapping in [`mapper`].
//!
//! # Available Services
//!
//! - [`services::short_url_service::ShortUrlService`] - Create, look up, and count redirects

pub mod mapper;
pub mod services;
