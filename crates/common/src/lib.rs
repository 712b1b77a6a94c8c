//! Shared types and utilities for podfs.
//!
//! This crate provides the pod URI model used across all podfs crates:
//! - `PodUri` - hierarchy navigation over resource identifiers
//! - `UriError` - shared URI error type

pub mod error;
pub mod uri;

pub use error::UriError;
pub use uri::PodUri;
