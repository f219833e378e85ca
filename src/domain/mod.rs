//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no Axum).
//! Only error types and validation rules.

pub mod errors;
pub mod validation;

pub use errors::DomainError;
pub use validation::FieldErrors;
