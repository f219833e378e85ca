//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Configuration loading (config)
//! - Database connection and migrations (db)
//! - Authentication (auth)
//! - Application state (state)
//! - HTTP server setup (server)

pub mod auth;
pub mod config;
pub mod db;
pub mod server;
pub mod state;

pub use state::AppState;
