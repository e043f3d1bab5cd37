//! # API Shared
//!
//! Shared utilities and definitions for the OT board APIs.
//!
//! Contains:
//! - Request/response types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - Session-token authorisation helpers
//!
//! Used by `api-rest` and the `otboard-run` binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{authorise, AccessError, SESSION_HEADER};
pub use health::HealthService;
