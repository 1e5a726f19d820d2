//! Data models for the delivery fee service
//!
//! - Observation: a typed station reading and its legacy archive shape
//! - Vehicle: courier vehicle types

pub mod observation;
pub mod vehicle;

pub use observation::{ObservationRecord, WeatherObservation};
pub use vehicle::VehicleType;
