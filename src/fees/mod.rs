//! Delivery fee rules
//!
//! A delivery fee is the sum of four independent components:
//! - RBF: regional base fee, looked up per vehicle and location
//! - ATEF: air temperature extra fee
//! - WSEF: wind speed extra fee
//! - WPEF: weather phenomenon extra fee
//!
//! WSEF and WPEF may forbid the vehicle outright instead of charging a fee.

pub mod engine;
pub mod phenomenon;
pub mod schedule;

pub use engine::FeeEngine;
pub use phenomenon::{PhenomenonCategory, PhenomenonTaxonomy};
pub use schedule::FeeSchedule;

pub const FORBIDDEN_USAGE_MESSAGE: &str = "Usage of selected vehicle type is forbidden";

/// Result of a component that may reject the vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeeOutcome {
    Fee(f64),
    Forbidden,
}

impl FeeOutcome {
    #[must_use]
    pub fn fee(self) -> Option<f64> {
        match self {
            FeeOutcome::Fee(fee) => Some(fee),
            FeeOutcome::Forbidden => None,
        }
    }

    #[must_use]
    pub fn is_forbidden(self) -> bool {
        matches!(self, FeeOutcome::Forbidden)
    }
}
