//! # Taskforge Shared Library
//!
//! Shared types and business logic used by the Taskforge API server and
//! its interactive surface.
//!
//! ## Module Organization
//!
//! - `db`: Connection pooling and migrations
//! - `models`: Database models and their SQL operations
//! - `auth`: Passwords, tokens, middleware, and the authorization guard
//! - `ops`: Validated lifecycle operations shared by both surfaces

pub mod auth;
pub mod db;
pub mod models;
pub mod ops;

/// Current version of the taskforge shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
