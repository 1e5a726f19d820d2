use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{debug, info};

use super::{FeedFetcher, StationAllowList};
use crate::config::WeatherConfig;
use crate::models::WeatherObservation;
use crate::models::observation::{format_observation_timestamp, parse_epoch_seconds};
use crate::{DeliveryFeeError, Result};

/// Observations XML structure for deserialization
#[derive(Debug, Deserialize)]
pub struct ObservationsXml {
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    #[serde(rename = "station", default)]
    pub stations: Vec<StationXml>,
}

#[derive(Debug, Deserialize)]
pub struct StationXml {
    pub name: String,
    #[serde(default)]
    pub wmocode: Option<String>,
    #[serde(default)]
    pub airtemperature: Option<String>,
    #[serde(default)]
    pub windspeed: Option<String>,
    #[serde(default)]
    pub phenomenon: Option<String>,
}

impl StationXml {
    fn to_observation(
        &self,
        station_name: String,
        observed_at: chrono::DateTime<chrono::Utc>,
        observation_timestamp: &str,
    ) -> Result<WeatherObservation> {
        let air_temperature = parse_metric(&station_name, "airtemperature", &self.airtemperature)?;
        let wind_speed = parse_metric(&station_name, "windspeed", &self.windspeed)?;

        Ok(WeatherObservation {
            wmo_code: self.wmocode.clone().unwrap_or_default().trim().to_string(),
            air_temperature,
            wind_speed,
            phenomenon: self.phenomenon.clone().unwrap_or_default().trim().to_string(),
            observed_at,
            observation_timestamp: observation_timestamp.to_string(),
            station_name,
        })
    }
}

fn parse_metric(station: &str, field: &str, value: &Option<String>) -> Result<f64> {
    let raw = value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DeliveryFeeError::parse(format!("Missing {field} for station {station}")))?;

    raw.parse::<f64>().map_err(|_| {
        DeliveryFeeError::parse(format!("Invalid {field} for station {station}: {raw}"))
    })
}

/// Parse an observations document, keeping only allow-listed stations.
///
/// The document-level timestamp is applied to every observation produced. A
/// malformed metric on any tracked station fails the whole document.
pub fn parse_feed(
    xml_content: &str,
    stations: &StationAllowList,
    timezone: Tz,
) -> Result<Vec<WeatherObservation>> {
    let document: ObservationsXml = from_str(xml_content)
        .map_err(|e| DeliveryFeeError::parse(format!("Failed to parse observations XML: {e}")))?;

    let observed_at = parse_epoch_seconds(&document.timestamp)?;
    let observation_timestamp = format_observation_timestamp(observed_at, timezone);

    let mut observations = Vec::new();
    for station in &document.stations {
        let station_name = station.name.trim().to_uppercase();
        if !stations.contains(&station_name) {
            debug!("Skipping untracked station {}", station_name);
            continue;
        }
        observations.push(station.to_observation(
            station_name,
            observed_at,
            &observation_timestamp,
        )?);
    }

    info!(
        "Parsed {} tracked observations out of {} stations",
        observations.len(),
        document.stations.len()
    );

    Ok(observations)
}

/// Fetcher for `https://www.ilmateenistus.ee/ilma_andmed/xml/observations.php`
pub struct IlmateenistusFeed {
    client: reqwest::Client,
    url: String,
    stations: StationAllowList,
    timezone: Tz,
}

impl IlmateenistusFeed {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(u64::from(config.timeout_seconds));
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryFeeError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.feed_url.clone(),
            stations: StationAllowList::new(&config.stations),
            timezone: config.timezone()?,
        })
    }
}

#[async_trait]
impl FeedFetcher for IlmateenistusFeed {
    #[tracing::instrument(name = "fetch_observations", level = "debug", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<WeatherObservation>> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let body = response.text().await?;
        parse_feed(&body, &self.stations, self.timezone)
    }
}
