//! Configuration management for the delivery fee service
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::DeliveryFeeError;
use crate::models::VehicleType;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the delivery fee service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryFeeConfig {
    /// Weather feed configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Refresh scheduling
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Observation archive endpoint
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Location → weather station mapping
    #[serde(default = "default_locations")]
    pub locations: Vec<LocationConfig>,
    /// Regional base fee table
    #[serde(default = "default_fees")]
    pub fees: Vec<BaseFeeConfig>,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather feed configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Observations XML feed URL
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Stations to keep from the feed
    #[serde(default = "default_stations")]
    pub stations: Vec<String>,
    /// IANA timezone used to render observation timestamps
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Refresh scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between refresh cycles
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Start the periodic refresh without waiting for a start request
    #[serde(default)]
    pub start_on_boot: bool,
    /// Delay the first periodic run to `align_to_minute`; `false` starts immediately
    #[serde(default = "default_align_first_run")]
    pub align_first_run: bool,
    /// Minute past the hour for the first periodic run
    #[serde(default = "default_align_to_minute")]
    pub align_to_minute: u32,
}

/// Observation archive settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_archive_url")]
    pub url: String,
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationConfig {
    pub name: String,
    pub station: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseFeeConfig {
    pub vehicle: VehicleType,
    pub location: String,
    pub fee: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_feed_url() -> String {
    "https://www.ilmateenistus.ee/ilma_andmed/xml/observations.php".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_stations() -> Vec<String> {
    vec![
        "TALLINN-HARKU".to_string(),
        "TARTU-TÕRAVERE".to_string(),
        "PÄRNU".to_string(),
    ]
}

fn default_timezone() -> String {
    "Europe/Tallinn".to_string()
}

fn default_interval() -> u64 {
    60 * 60
}

fn default_align_first_run() -> bool {
    true
}

fn default_align_to_minute() -> u32 {
    15
}

fn default_archive_url() -> String {
    "http://localhost:8080/api/weatherdata/add".to_string()
}

fn default_locations() -> Vec<LocationConfig> {
    [
        ("TALLINN", "TALLINN-HARKU"),
        ("TARTU", "TARTU-TÕRAVERE"),
        ("PÄRNU", "PÄRNU"),
    ]
    .into_iter()
    .map(|(name, station)| LocationConfig {
        name: name.to_string(),
        station: station.to_string(),
    })
    .collect()
}

fn default_fees() -> Vec<BaseFeeConfig> {
    [
        (VehicleType::Car, "TALLINN", 4.0),
        (VehicleType::Scooter, "TALLINN", 3.5),
        (VehicleType::Bike, "TALLINN", 3.0),
        (VehicleType::Car, "TARTU", 3.5),
        (VehicleType::Scooter, "TARTU", 3.0),
        (VehicleType::Bike, "TARTU", 2.5),
        (VehicleType::Car, "PÄRNU", 3.0),
        (VehicleType::Scooter, "PÄRNU", 2.5),
        (VehicleType::Bike, "PÄRNU", 2.0),
    ]
    .into_iter()
    .map(|(vehicle, location, fee)| BaseFeeConfig {
        vehicle,
        location: location.to_string(),
        fee,
    })
    .collect()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            timeout_seconds: default_weather_timeout(),
            stations: default_stations(),
            timezone: default_timezone(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            start_on_boot: false,
            align_first_run: default_align_first_run(),
            align_to_minute: default_align_to_minute(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_archive_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DeliveryFeeConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            scheduler: SchedulerConfig::default(),
            archive: ArchiveConfig::default(),
            locations: default_locations(),
            fees: default_fees(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl WeatherConfig {
    /// Parsed [`WeatherConfig::timezone`]
    pub fn timezone(&self) -> crate::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| DeliveryFeeError::config(format!("Unknown timezone '{}'", self.timezone)))
    }
}

impl SchedulerConfig {
    /// Minute the first periodic run waits for, if alignment is enabled
    #[must_use]
    pub fn alignment(&self) -> Option<u32> {
        self.align_first_run.then_some(self.align_to_minute)
    }
}

impl DeliveryFeeConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with DELIVERYFEE_ prefix
        builder = builder.add_source(
            Environment::with_prefix("DELIVERYFEE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DeliveryFeeConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("deliveryfee").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.feed_url.is_empty() {
            self.weather.feed_url = default_feed_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.timezone.is_empty() {
            self.weather.timezone = default_timezone();
        }
        if self.scheduler.interval_seconds == 0 {
            self.scheduler.interval_seconds = default_interval();
        }
        if self.archive.url.is_empty() {
            self.archive.url = default_archive_url();
        }
        if self.archive.timeout_seconds == 0 {
            self.archive.timeout_seconds = default_weather_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tables()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(DeliveryFeeError::config(
                "Weather feed timeout cannot exceed 300 seconds"
            ).into());
        }

        if self.archive.timeout_seconds > 300 {
            return Err(DeliveryFeeError::config(
                "Archive timeout cannot exceed 300 seconds"
            ).into());
        }

        if self.scheduler.align_to_minute > 59 {
            return Err(DeliveryFeeError::config(format!(
                "Scheduler alignment minute must be 0-59, got {}",
                self.scheduler.align_to_minute
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DeliveryFeeError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DeliveryFeeError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        for (name, url) in [("Weather feed", &self.weather.feed_url), ("Archive", &self.archive.url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DeliveryFeeError::config(
                    format!("{name} URL must be a valid HTTP or HTTPS URL")
                ).into());
            }
        }

        self.weather.timezone()?;

        Ok(())
    }

    /// Validate station, location and fee tables
    fn validate_tables(&self) -> Result<()> {
        if self.weather.stations.is_empty() {
            return Err(DeliveryFeeError::config("At least one weather station must be tracked").into());
        }

        for location in &self.locations {
            let station = location.station.trim().to_uppercase();
            if !self
                .weather
                .stations
                .iter()
                .any(|s| s.trim().to_uppercase() == station)
            {
                return Err(DeliveryFeeError::config(format!(
                    "Location '{}' uses station '{}' which is not tracked",
                    location.name, location.station
                ))
                .into());
            }
        }

        if let Some(fee) = self.fees.iter().find(|f| !f.fee.is_finite() || f.fee < 0.0) {
            return Err(DeliveryFeeError::config(format!(
                "Invalid base fee {} for {} in {}",
                fee.fee, fee.vehicle, fee.location
            ))
            .into());
        }

        Ok(())
    }
}
