//! Archiving of refreshed observations to an external store

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ArchiveConfig;
use crate::models::WeatherObservation;
use crate::{DeliveryFeeError, Result};

/// Receiver for every observation written by a refresh cycle
#[async_trait]
pub trait ObservationArchive: Send + Sync {
    async fn archive(&self, observation: &WeatherObservation) -> Result<()>;
}

/// Posts observations as legacy JSON to an HTTP endpoint
pub struct HttpArchive {
    client: reqwest::Client,
    url: String,
}

impl HttpArchive {
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(|e| DeliveryFeeError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl ObservationArchive for HttpArchive {
    #[tracing::instrument(name = "archive_observation", level = "debug", skip(self, observation), fields(station = %observation.station_name))]
    async fn archive(&self, observation: &WeatherObservation) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&observation.to_record())
            .send()
            .await
            .map_err(|e| DeliveryFeeError::archive(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryFeeError::archive(format!(
                "{} responded with {}",
                self.url, status
            )));
        }

        debug!("Archived observation, status {}", status);
        Ok(())
    }
}
