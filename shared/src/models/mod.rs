//! Domain models for snack inventory tracking

mod tracking;

pub use tracking::*;
