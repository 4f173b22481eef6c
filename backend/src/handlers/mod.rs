//! HTTP handlers

pub mod health;
pub mod statistics;
pub mod tracking;

pub use health::*;
pub use statistics::*;
pub use tracking::*;
