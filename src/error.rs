//! Error types and handling for the delivery fee service

use thiserror::Error;

/// Main error type for the delivery fee service
#[derive(Error, Debug)]
pub enum DeliveryFeeError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A location was registered twice
    #[error("Location already registered: {location}")]
    DuplicateLocation { location: String },

    /// Unknown location or vehicle, or no observation cached yet
    #[error("{message}")]
    NotFound { message: String },

    /// No regional base fee configured for the vehicle/location pair
    #[error("No regional base fee for {vehicle} in {location}")]
    MissingFeeSchedule { vehicle: String, location: String },

    /// Weather feed could not be retrieved
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// Weather feed could not be parsed
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Observation could not be archived
    #[error("Archive error: {message}")]
    Archive { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DeliveryFeeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn duplicate_location<S: Into<String>>(location: S) -> Self {
        Self::DuplicateLocation {
            location: location.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn missing_fee_schedule<V: Into<String>, L: Into<String>>(vehicle: V, location: L) -> Self {
        Self::MissingFeeSchedule {
            vehicle: vehicle.into(),
            location: location.into(),
        }
    }

    /// Create a new fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new archive error
    pub fn archive<S: Into<String>>(message: S) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// Whether the error is a lookup miss the caller can show to the user as-is
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DeliveryFeeError::NotFound { .. } | DeliveryFeeError::MissingFeeSchedule { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DeliveryFeeError::Config { .. } | DeliveryFeeError::DuplicateLocation { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            DeliveryFeeError::NotFound { message } => message.clone(),
            DeliveryFeeError::MissingFeeSchedule { .. } => {
                "No data for these regional base fee parameters.".to_string()
            }
            DeliveryFeeError::Fetch { .. } => {
                "Unable to reach the weather service. Please try again later.".to_string()
            }
            DeliveryFeeError::Parse { .. } => {
                "The weather service returned data that could not be read.".to_string()
            }
            DeliveryFeeError::Archive { .. } => {
                "Weather observation could not be archived.".to_string()
            }
            DeliveryFeeError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for DeliveryFeeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeliveryFeeError::fetch(format!("request timed out: {err}"))
        } else {
            DeliveryFeeError::fetch(err.to_string())
        }
    }
}
