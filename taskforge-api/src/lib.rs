//! # TaskForge API Server Library
//!
//! Core functionality for the TaskForge API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: JSON API route handlers
//! - `surface`: stateful managers backing the interactive UI

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod surface;
