//! # API Shared
//!
//! Shared utilities and definitions for SymCheck APIs.
//!
//! Contains:
//! - Wire types (`dto` module) with OpenAPI schemas
//! - Conversions from core results into those wire types
//! - Shared services like `HealthService`

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
