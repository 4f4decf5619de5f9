//! Hub configuration
//!
//! Loaded from JSON, e.g.
//!
//! ```json
//! {
//!   "devices": [{ "did": "E0001", "nick": "Downstairs", "deviceName": "DEEBOT OZMO 950" }],
//!   "legacy_room_sensors": true
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use deebot_events::DeviceInfo;

use crate::error::{Result, SensorError};

/// Configuration for a [`DeebotHub`](crate::hub::DeebotHub)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Robots managed by the hub
    pub devices: Vec<DeviceInfo>,

    /// Create one polled sensor per room type
    /// Default: false
    pub legacy_room_sensors: bool,

    /// Whether the host enables new sensors on first registration
    /// Default: false
    pub entity_registry_enabled_default: bool,
}

impl HubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document
    ///
    /// The result is validated before it is returned.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HubConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading hub configuration");

        let json = std::fs::read_to_string(path).map_err(|source| SensorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject empty and duplicate device ids
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for device in &self.devices {
            if device.did.trim().is_empty() {
                return Err(SensorError::InvalidConfig(
                    "Device id must not be empty".to_string(),
                ));
            }

            if !seen.insert(device.did.as_str()) {
                return Err(SensorError::InvalidConfig(format!(
                    "Device {} is listed more than once",
                    device.did
                )));
            }
        }

        Ok(())
    }

    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.devices.push(device);
        self
    }

    pub fn with_legacy_room_sensors(mut self, enabled: bool) -> Self {
        self.legacy_room_sensors = enabled;
        self
    }

    pub fn with_entity_registry_enabled_default(mut self, enabled: bool) -> Self {
        self.entity_registry_enabled_default = enabled;
        self
    }
}
