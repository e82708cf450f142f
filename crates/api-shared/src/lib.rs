//! # API Shared
//!
//! Shared definitions for the scribe APIs.
//!
//! Contains:
//! - JSON request/response bodies with OpenAPI schemas (`types` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
