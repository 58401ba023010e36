//! Data Transfer Objects for API requests and responses.
//!
//! All bodies are camelCase JSON.

pub mod shorten;
pub mod stats;
