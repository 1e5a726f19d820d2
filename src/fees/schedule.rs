use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::VehicleType;
use crate::{DeliveryFeeError, Result};

/// Regional base fees per (vehicle, location).
///
/// Entries may be overwritten at runtime while fee requests are being served.
#[derive(Debug, Default)]
pub struct FeeSchedule {
    fees: RwLock<HashMap<(VehicleType, String), f64>>,
}

impl FeeSchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fee for a vehicle/location pair
    pub fn set(&self, vehicle: VehicleType, location: &str, fee: f64) {
        self.fees
            .write()
            .insert((vehicle, location.trim().to_uppercase()), fee);
    }

    pub fn get(&self, vehicle: VehicleType, location: &str) -> Result<f64> {
        let location = location.trim().to_uppercase();
        self.fees
            .read()
            .get(&(vehicle, location.clone()))
            .copied()
            .ok_or_else(|| DeliveryFeeError::missing_fee_schedule(vehicle.as_str(), location))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fees.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fees.read().is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(VehicleType, S, f64)> for FeeSchedule {
    fn from_iter<I: IntoIterator<Item = (VehicleType, S, f64)>>(iter: I) -> Self {
        let schedule = FeeSchedule::new();
        for (vehicle, location, fee) in iter {
            schedule.set(vehicle, location.as_ref(), fee);
        }
        schedule
    }
}
