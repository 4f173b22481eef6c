//! Shared types and domain logic for the snack inventory tracking subsystem
//!
//! This crate holds everything that can be computed without I/O: the tracking
//! data model, calendar week arithmetic, update validation, the statistics
//! aggregator, the week-over-week comparator and re-order recommendations.
//! It is used by the backend server and, via WASM, by the browser front end.

pub mod comparison;
pub mod models;
pub mod recommendation;
pub mod statistics;
pub mod types;
pub mod validation;
pub mod week;

pub use comparison::*;
pub use models::*;
pub use recommendation::*;
pub use statistics::*;
pub use types::*;
pub use validation::*;
pub use week::*;
