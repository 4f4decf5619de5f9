use std::path::PathBuf;

use thiserror::Error;

use crate::logging::LoggingError;

/// Errors that can occur while setting up Deebot sensors
#[derive(Error, Debug)]
pub enum SensorError {
    /// Configuration file could not be read
    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid JSON for the expected shape
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration parsed but is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A device with this id is already managed by the hub
    #[error("Device {0} is already registered")]
    DuplicateDevice(String),

    /// Logging could not be initialised
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Result type for sensor setup operations
pub type Result<T> = std::result::Result<T, SensorError>;
