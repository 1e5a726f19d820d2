//! In-memory observation store
//!
//! Holds the latest [`WeatherObservation`] per station together with the
//! location → station index used to answer fee requests. The index is filled
//! while the store is still exclusively owned; once the store is shared behind
//! an `Arc` it can only be read. Observation batches are published by swapping
//! in a new map, so readers see either the previous or the next batch.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::models::WeatherObservation;
use crate::{DeliveryFeeError, Result};

type ObservationMap = HashMap<String, Arc<WeatherObservation>>;

/// Location name → station name, both upper-cased
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    stations: HashMap<String, String>,
}

impl LocationIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `location` as served by `station`.
    ///
    /// Fails with [`DeliveryFeeError::DuplicateLocation`] if the location is already
    /// known, regardless of case.
    pub fn register(&mut self, location: &str, station: &str) -> Result<()> {
        let key = normalise(location);
        if self.stations.contains_key(&key) {
            return Err(DeliveryFeeError::duplicate_location(key));
        }
        self.stations.insert(key, normalise(station));
        Ok(())
    }

    #[must_use]
    pub fn station_for(&self, location: &str) -> Option<&str> {
        self.stations.get(&normalise(location)).map(String::as_str)
    }

    /// Station serving `location`, or `NotFound` naming the unknown location
    pub fn resolve(&self, location: &str) -> Result<&str> {
        self.station_for(location).ok_or_else(|| {
            DeliveryFeeError::not_found(format!("No such location with name: {location}"))
        })
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

pub struct ObservationStore {
    locations: LocationIndex,
    observations: RwLock<Arc<ObservationMap>>,
}

impl ObservationStore {
    #[must_use]
    pub fn new(locations: LocationIndex) -> Self {
        Self {
            locations,
            observations: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    pub fn register_location(&mut self, location: &str, station: &str) -> Result<()> {
        self.locations.register(location, station)
    }

    #[must_use]
    pub fn locations(&self) -> &LocationIndex {
        &self.locations
    }

    /// Write every observation under its station name as one batch.
    ///
    /// Stations missing from `observations` keep whatever was cached before.
    /// Returns the number of stations written.
    pub fn update_from(&self, observations: Vec<WeatherObservation>) -> usize {
        if observations.is_empty() {
            return 0;
        }

        let count = observations.len();
        let mut guard = self.observations.write();
        let mut next: ObservationMap = guard.as_ref().clone();
        for observation in observations {
            next.insert(observation.station_name.clone(), Arc::new(observation));
        }
        *guard = Arc::new(next);
        count
    }

    /// Latest observation for the station serving `location`.
    pub fn latest_for(&self, location: &str) -> Result<Arc<WeatherObservation>> {
        let station = self.locations.resolve(location)?;

        let snapshot = self.snapshot();
        let observation = snapshot.get(station).cloned().ok_or_else(|| {
            DeliveryFeeError::not_found(format!(
                "Could not find data for location: {}",
                normalise(location)
            ))
        })?;

        debug!("Resolved {} to station {}", location, station);
        Ok(observation)
    }

    /// Latest observation cached for a station, by station name
    #[must_use]
    pub fn latest_for_station(&self, station: &str) -> Option<Arc<WeatherObservation>> {
        self.snapshot().get(&normalise(station)).cloned()
    }

    /// The currently published batch
    #[must_use]
    pub fn snapshot(&self) -> Arc<ObservationMap> {
        Arc::clone(&self.observations.read())
    }
}

fn normalise(name: &str) -> String {
    name.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn observation(station: &str, temperature: f64) -> WeatherObservation {
        WeatherObservation {
            station_name: station.to_string(),
            wmo_code: String::new(),
            air_temperature: temperature,
            wind_speed: 3.0,
            phenomenon: "Clear".to_string(),
            observed_at: Utc::now(),
            observation_timestamp: String::new(),
        }
    }

    fn store() -> ObservationStore {
        let mut index = LocationIndex::new();
        index.register("Tallinn", "Tallinn-Harku").unwrap();
        index.register("Tartu", "Tartu-Tõravere").unwrap();
        index.register("Tõravere", "Tartu-Tõravere").unwrap();
        ObservationStore::new(index)
    }

    #[test]
    fn test_duplicate_location_is_rejected() {
        let mut index = LocationIndex::new();
        index.register("Tallinn", "TALLINN-HARKU").unwrap();
        let err = index.register("TALLINN", "PÄRNU").unwrap_err();
        assert!(matches!(err, DeliveryFeeError::DuplicateLocation { ref location } if location == "TALLINN"));
        assert_eq!(index.station_for("tallinn"), Some("TALLINN-HARKU"));
        assert_eq!(index.resolve("Tallinn").unwrap(), "TALLINN-HARKU");
        assert!(index.resolve("Narva").unwrap_err().is_not_found());
    }

    #[test]
    fn test_store_register_location_rejects_duplicates() {
        let mut store = store();
        assert!(store.register_location("pärnu", "Pärnu").is_ok());
        assert!(store.register_location("PÄRNU", "Pärnu").is_err());
    }

    #[test]
    fn test_latest_for_before_any_refresh() {
        let store = store();
        let err = store.latest_for("Tallinn").unwrap_err();
        assert!(matches!(err, DeliveryFeeError::NotFound { .. }));
    }

    #[test]
    fn test_latest_for_unknown_location() {
        let store = store();
        let err = store.latest_for("Narva").unwrap_err();
        assert_eq!(err.to_string(), "No such location with name: Narva");
    }

    #[test]
    fn test_locations_share_a_station() {
        let store = store();
        store.update_from(vec![observation("TARTU-TÕRAVERE", -4.0)]);

        let tartu = store.latest_for("tartu").unwrap();
        let toravere = store.latest_for("TÕRAVERE").unwrap();
        assert!(Arc::ptr_eq(&tartu, &toravere));
    }

    #[test]
    fn test_absent_station_keeps_previous_entry() {
        let store = store();
        store.update_from(vec![
            observation("TALLINN-HARKU", 1.0),
            observation("TARTU-TÕRAVERE", 2.0),
        ]);
        store.update_from(vec![observation("TALLINN-HARKU", 5.0)]);

        assert_eq!(store.latest_for("Tallinn").unwrap().air_temperature, 5.0);
        assert_eq!(store.latest_for("Tartu").unwrap().air_temperature, 2.0);
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_batches() {
        let store = store();
        store.update_from(vec![observation("TALLINN-HARKU", 1.0)]);
        let before = store.snapshot();

        store.update_from(vec![observation("TALLINN-HARKU", 9.0)]);

        assert_eq!(before["TALLINN-HARKU"].air_temperature, 1.0);
        assert_eq!(store.snapshot()["TALLINN-HARKU"].air_temperature, 9.0);
        assert_eq!(
            store.latest_for_station("tallinn-harku").unwrap().air_temperature,
            9.0
        );
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let store = store();
        assert_eq!(store.update_from(Vec::new()), 0);
        assert!(store.snapshot().is_empty());
    }
}
