//! `deliveryfee` - courier delivery fees driven by live weather observations
//!
//! This library provides the fee rules for cars, scooters and bikes, the
//! observation store they read from, and the scheduler that keeps the store
//! fresh from the national weather service feed.

pub mod api;
pub mod app;
pub mod archive;
pub mod config;
pub mod delivery;
pub mod error;
pub mod fees;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use app::AppState;
pub use config::DeliveryFeeConfig;
pub use delivery::{DeliveryFeeService, FeeBreakdown, FeeQuote};
pub use error::DeliveryFeeError;
pub use fees::{FeeEngine, FeeOutcome, FeeSchedule, PhenomenonTaxonomy};
pub use models::{ObservationRecord, VehicleType, WeatherObservation};
pub use scheduler::{CycleOutcome, RefreshScheduler, RefreshState};
pub use store::{LocationIndex, ObservationStore};
pub use weather::{FeedFetcher, IlmateenistusFeed, StationAllowList};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DeliveryFeeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
