//! Shared utilities, configuration, and error handling for Threadline
//!
//! This crate provides common functionality used across the Threadline application:
//! - Configuration management following 12-factor principles
//! - Error types and the JSON error envelope
//! - Success envelope and pagination metadata
//! - Validating request extractors

pub mod config;
pub mod error;
pub mod extractors;
pub mod pagination;
pub mod response;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
pub use pagination::{PageMeta, PageParams, PageQuery};
pub use response::ApiResponse;
