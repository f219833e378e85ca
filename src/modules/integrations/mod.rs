//! Clients for external services.

pub mod prediction;
