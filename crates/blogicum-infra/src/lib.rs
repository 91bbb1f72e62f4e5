//! # Blogicum Infrastructure
//!
//! Concrete implementations of the ports defined in `blogicum-core`.
//! This crate contains the PostgreSQL store, the in-memory store and the
//! authentication services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL store via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod database;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::DatabaseConnections;
pub use memory::InMemoryStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
