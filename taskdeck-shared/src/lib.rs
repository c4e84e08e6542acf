//! # TaskDeck Shared Library
//!
//! This crate contains shared types, models, and business logic used by the
//! TaskDeck API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their owner-scoped CRUD operations
//! - `auth`: Google OAuth client, session manager, and session middleware
//! - `db`: Connection pool and migration utilities

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
