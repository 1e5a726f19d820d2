//! Weather observation model for a single station reading

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::DeliveryFeeError;

/// Rendering of observation timestamps kept for compatibility with existing consumers.
///
/// The hour is printed on the 24-hour clock while the AM/PM marker is still appended,
/// so `1678738197` in Tallinn renders as `2023-03-13 22:09:57 PM`.
pub const OBSERVATION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %p";

/// A parsed snapshot of one station's reading.
///
/// Observations are shared behind `Arc` once cached and never mutated; a refresh
/// produces a fresh instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Canonical, upper-cased station name
    pub station_name: String,
    /// WMO station code (may be empty for unregistered stations)
    pub wmo_code: String,
    /// Air temperature in Celsius
    pub air_temperature: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Free-text phenomenon as reported by the feed
    pub phenomenon: String,
    /// Instant the feed was generated
    pub observed_at: DateTime<Utc>,
    /// `observed_at` rendered in the configured timezone
    pub observation_timestamp: String,
}

impl WeatherObservation {
    pub fn to_record(&self) -> ObservationRecord {
        ObservationRecord::from(self)
    }
}

/// Legacy JSON shape used by the archive endpoint; every value is a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    pub station_name: String,
    pub station_wmo_code: String,
    pub air_temperature: String,
    pub wind_speed: String,
    pub weather_phenomenon: String,
    pub observation_timestamp: String,
}

impl From<&WeatherObservation> for ObservationRecord {
    fn from(observation: &WeatherObservation) -> Self {
        Self {
            station_name: observation.station_name.clone(),
            station_wmo_code: observation.wmo_code.clone(),
            air_temperature: legacy_float(observation.air_temperature),
            wind_speed: legacy_float(observation.wind_speed),
            weather_phenomenon: observation.phenomenon.clone(),
            observation_timestamp: observation.observation_timestamp.clone(),
        }
    }
}

/// Floats keep a trailing `.0` when integral (`-11.0`, `5.0`, `2.3`).
#[must_use]
pub fn legacy_float(value: f64) -> String {
    format!("{value:?}")
}

/// Parse a Unix epoch-seconds string into a UTC instant.
pub fn parse_epoch_seconds(value: &str) -> Result<DateTime<Utc>, DeliveryFeeError> {
    let seconds = value
        .trim()
        .parse::<i64>()
        .map_err(|_| DeliveryFeeError::parse(format!("Invalid timestamp: {value}")))?;
    let millis = seconds
        .checked_mul(1000)
        .ok_or_else(|| DeliveryFeeError::parse(format!("Timestamp out of range: {value}")))?;

    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DeliveryFeeError::parse(format!("Timestamp out of range: {value}")))
}

/// Render an instant in `timezone` using [`OBSERVATION_TIMESTAMP_FORMAT`].
#[must_use]
pub fn format_observation_timestamp(instant: DateTime<Utc>, timezone: Tz) -> String {
    timezone
        .from_utc_datetime(&instant.naive_utc())
        .format(OBSERVATION_TIMESTAMP_FORMAT)
        .to_string()
}
