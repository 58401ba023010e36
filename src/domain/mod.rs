//! Domain layer containing business entities and rules.
//!
//! Nothing in here knows about HTTP or SQL.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures and the redirect transition
//! - [`repositories`] - Data access trait definitions
//! - [`code_policy`] - Short code generation and format validation
//!
//! # Redirect Accounting
//!
//! 1. The service reads a record through [`repositories::ShortUrlRepository`]
//! 2. [`entities::ShortUrl::apply_redirect`] produces the advanced record
//! 3. The store accepts it only if nobody advanced the record in between

pub mod code_policy;
pub mod entities;
pub mod repositories;
