//! Feature modules that sit beside the CRUD services.

pub mod grading;
pub mod integrations;
