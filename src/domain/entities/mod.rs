//! Core domain entities.
//!
//! Entities are plain data structures; the only behaviour they carry is the
//! redirect-accounting transition on [`ShortUrl`].
//!
//! - [`ShortUrl`] - A stored short code with its usage statistics
//! - [`NewShortUrl`] - Input for creating a record
//! - [`RedirectCount`] - Non-negative redirect counter

pub mod short_url;

pub use short_url::{NewShortUrl, RedirectCount, ShortUrl};
