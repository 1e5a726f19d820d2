//! Courier vehicle types

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DeliveryFeeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleType {
    Car,
    Scooter,
    Bike,
}

impl VehicleType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "CAR",
            VehicleType::Scooter => "SCOOTER",
            VehicleType::Bike => "BIKE",
        }
    }

    /// Scooters and bikes are exposed to temperature and precipitation surcharges
    #[must_use]
    pub fn is_open_air(&self) -> bool {
        matches!(self, VehicleType::Scooter | VehicleType::Bike)
    }
}

impl FromStr for VehicleType {
    type Err = DeliveryFeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CAR" => Ok(VehicleType::Car),
            "SCOOTER" => Ok(VehicleType::Scooter),
            "BIKE" => Ok(VehicleType::Bike),
            _ => Err(DeliveryFeeError::not_found(format!("No such vehicle type: {s}"))),
        }
    }
}

impl Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
