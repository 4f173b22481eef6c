//! Domain models for the snack tracking server
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
