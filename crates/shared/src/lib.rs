//! Shared types, auth primitives, and configuration for Hearth.
//!
//! This crate provides common types used across all other crates:
//! - JWT claims and the token service
//! - Currency codes for minor-unit amounts
//! - Configuration management

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use auth::{AuthTokens, Claims};
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
