//! Delivery fee orchestration
//!
//! Resolves a location to its latest observation and runs the fee rules over it.

use std::fmt::Display;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::Result;
use crate::fees::{FORBIDDEN_USAGE_MESSAGE, FeeEngine, FeeOutcome};
use crate::models::VehicleType;
use crate::models::observation::legacy_float;
use crate::store::ObservationStore;

/// Itemised fee for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub location: String,
    pub vehicle: VehicleType,
    pub station_name: String,
    pub air_temperature: f64,
    pub wind_speed: f64,
    pub weather_phenomenon: String,
    pub observation_timestamp: String,
    pub regional_base_fee: f64,
    pub air_temperature_fee: f64,
    pub wind_speed_fee: f64,
    pub weather_phenomenon_fee: f64,
    pub total: f64,
}

/// Either a full breakdown or a refusal to deliver with the chosen vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FeeQuote {
    Breakdown(FeeBreakdown),
    Forbidden { message: String },
}

impl FeeQuote {
    #[must_use]
    pub fn total(&self) -> Option<f64> {
        match self {
            FeeQuote::Breakdown(breakdown) => Some(breakdown.total),
            FeeQuote::Forbidden { .. } => None,
        }
    }
}

impl Display for FeeBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Input parameters: {} and {} -> RBF = {} €",
            self.location,
            self.vehicle,
            legacy_float(self.regional_base_fee)
        )?;
        writeln!(
            f,
            "Latest weather data for {} ({}) at {}:",
            self.location, self.station_name, self.observation_timestamp
        )?;
        writeln!(
            f,
            " Air temperature = {}°C -> ATEF = {} €",
            legacy_float(self.air_temperature),
            legacy_float(self.air_temperature_fee)
        )?;
        writeln!(
            f,
            " Wind speed = {} m/s -> WSEF = {} €",
            legacy_float(self.wind_speed),
            legacy_float(self.wind_speed_fee)
        )?;
        writeln!(
            f,
            " Weather phenomenon = {} -> WPEF = {} €",
            self.weather_phenomenon,
            legacy_float(self.weather_phenomenon_fee)
        )?;
        write!(
            f,
            "Total delivery fee = RBF + ATEF + WSEF + WPEF = {} + {} + {} + {} = {} €",
            legacy_float(self.regional_base_fee),
            legacy_float(self.air_temperature_fee),
            legacy_float(self.wind_speed_fee),
            legacy_float(self.weather_phenomenon_fee),
            legacy_float(self.total)
        )
    }
}

impl Display for FeeQuote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeeQuote::Breakdown(breakdown) => breakdown.fmt(f),
            FeeQuote::Forbidden { message } => f.write_str(message),
        }
    }
}

pub struct DeliveryFeeService {
    store: Arc<ObservationStore>,
    engine: Arc<FeeEngine>,
}

impl DeliveryFeeService {
    #[must_use]
    pub fn new(store: Arc<ObservationStore>, engine: Arc<FeeEngine>) -> Self {
        Self { store, engine }
    }

    #[must_use]
    pub fn engine(&self) -> &FeeEngine {
        &self.engine
    }

    /// Compute the fee from raw request parameters, both matched case-insensitively.
    ///
    /// An unknown location is reported before an unknown vehicle.
    pub fn quote(&self, vehicle: &str, location: &str) -> Result<FeeQuote> {
        self.store.locations().resolve(location)?;
        let vehicle: VehicleType = vehicle.parse()?;
        self.compute_fee(vehicle, location)
    }

    /// Compute the fee for `vehicle` delivering in `location`.
    ///
    /// Fails with `NotFound` when the location is unknown or has no observation yet,
    /// and with `MissingFeeSchedule` when no base fee is configured. Forbidden usage
    /// is reported as [`FeeQuote::Forbidden`].
    #[instrument(level = "debug", skip(self))]
    pub fn compute_fee(&self, vehicle: VehicleType, location: &str) -> Result<FeeQuote> {
        let observation = self.store.latest_for(location)?;

        let wind_speed_fee = FeeEngine::wind_speed_fee(observation.wind_speed, vehicle);
        let weather_phenomenon_fee = self
            .engine
            .weather_phenomenon_fee(&observation.phenomenon, vehicle);

        let (Some(wind_speed_fee), Some(weather_phenomenon_fee)) =
            (wind_speed_fee.fee(), weather_phenomenon_fee.fee())
        else {
            debug!(
                "{} forbidden at {}: wind {} m/s, phenomenon {:?}",
                vehicle, observation.station_name, observation.wind_speed, observation.phenomenon
            );
            return Ok(FeeQuote::Forbidden {
                message: FORBIDDEN_USAGE_MESSAGE.to_string(),
            });
        };

        let regional_base_fee = self.engine.regional_base_fee(vehicle, location)?;
        let air_temperature_fee = FeeEngine::air_temperature_fee(observation.air_temperature, vehicle);
        let total = regional_base_fee + air_temperature_fee + wind_speed_fee + weather_phenomenon_fee;

        Ok(FeeQuote::Breakdown(FeeBreakdown {
            location: location.trim().to_uppercase(),
            vehicle,
            station_name: observation.station_name.clone(),
            air_temperature: observation.air_temperature,
            wind_speed: observation.wind_speed,
            weather_phenomenon: observation.phenomenon.clone(),
            observation_timestamp: observation.observation_timestamp.clone(),
            regional_base_fee,
            air_temperature_fee,
            wind_speed_fee,
            weather_phenomenon_fee,
            total,
        }))
    }
}
