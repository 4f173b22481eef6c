//! Business logic services for snack inventory tracking

pub mod statistics;
pub mod tracking;

pub use statistics::StatisticsService;
pub use tracking::TrackingService;
