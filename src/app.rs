//! Wiring of the service components from configuration

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::Result;
use crate::archive::{HttpArchive, ObservationArchive};
use crate::config::DeliveryFeeConfig;
use crate::delivery::DeliveryFeeService;
use crate::fees::{FeeEngine, FeeSchedule, PhenomenonTaxonomy};
use crate::scheduler::RefreshScheduler;
use crate::store::{LocationIndex, ObservationStore};
use crate::weather::{FeedFetcher, IlmateenistusFeed};

/// Shared handles used by the HTTP layer and `main`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ObservationStore>,
    pub service: Arc<DeliveryFeeService>,
    pub scheduler: Arc<RefreshScheduler>,
}

impl AppState {
    /// Build the production components: live feed and optional HTTP archive
    pub fn from_config(config: &DeliveryFeeConfig) -> Result<Self> {
        let fetcher: Arc<dyn FeedFetcher> = Arc::new(IlmateenistusFeed::new(&config.weather)?);
        let archive: Option<Arc<dyn ObservationArchive>> = if config.archive.enabled {
            Some(Arc::new(HttpArchive::new(&config.archive)?))
        } else {
            None
        };
        Self::with_fetcher(config, fetcher, archive)
    }

    /// Build the components around a given feed and archive
    pub fn with_fetcher(
        config: &DeliveryFeeConfig,
        fetcher: Arc<dyn FeedFetcher>,
        archive: Option<Arc<dyn ObservationArchive>>,
    ) -> Result<Self> {
        let store = Arc::new(build_store(config)?);
        let engine = Arc::new(build_engine(config));
        let service = Arc::new(DeliveryFeeService::new(Arc::clone(&store), engine));

        let mut scheduler = RefreshScheduler::new(
            fetcher,
            Arc::clone(&store),
            Duration::from_secs(config.scheduler.interval_seconds),
        )?
        .with_alignment(config.scheduler.alignment());
        if let Some(archive) = archive {
            scheduler = scheduler.with_archive(archive);
        }

        info!(
            "Tracking {} stations for {} locations",
            config.weather.stations.len(),
            store.locations().len()
        );

        Ok(Self {
            store,
            service,
            scheduler: Arc::new(scheduler),
        })
    }
}

/// Register every configured location; a duplicate location is fatal.
pub fn build_store(config: &DeliveryFeeConfig) -> Result<ObservationStore> {
    let mut index = LocationIndex::new();
    for location in &config.locations {
        index.register(&location.name, &location.station)?;
    }
    Ok(ObservationStore::new(index))
}

#[must_use]
pub fn build_engine(config: &DeliveryFeeConfig) -> FeeEngine {
    let schedule: FeeSchedule = config
        .fees
        .iter()
        .map(|fee| (fee.vehicle, fee.location.as_str(), fee.fee))
        .collect();
    FeeEngine::new(schedule, PhenomenonTaxonomy::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeliveryFeeError;
    use crate::config::LocationConfig;
    use crate::models::VehicleType;

    #[test]
    fn test_duplicate_location_in_config_is_fatal() {
        let mut config = DeliveryFeeConfig::default();
        config.locations.push(LocationConfig {
            name: "tallinn".to_string(),
            station: "PÄRNU".to_string(),
        });

        let err = build_store(&config).err().unwrap();
        assert!(matches!(err, DeliveryFeeError::DuplicateLocation { .. }));
    }

    #[test]
    fn test_engine_is_seeded_from_fee_table() {
        let engine = build_engine(&DeliveryFeeConfig::default());
        assert_eq!(engine.regional_base_fee(VehicleType::Car, "Tallinn").unwrap(), 4.0);
        assert_eq!(engine.regional_base_fee(VehicleType::Scooter, "Tartu").unwrap(), 3.0);
        assert_eq!(engine.regional_base_fee(VehicleType::Bike, "Pärnu").unwrap(), 2.0);
    }
}
