//! Managed robots
//!
//! The hub is passed explicitly to [`setup_entry`](crate::setup::setup_entry);
//! there is no process-wide registry.

use std::sync::Arc;

use tracing::{debug, info};

use deebot_events::VacuumBot;

use crate::config::HubConfig;
use crate::error::{Result, SensorError};

/// Configuration plus the robots it manages
#[derive(Debug)]
pub struct DeebotHub {
    config: HubConfig,
    bots: Vec<Arc<VacuumBot>>,
}

impl DeebotHub {
    /// Create a hub with no robots
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            bots: Vec::new(),
        }
    }

    /// Validate `config` and create one robot handle per configured device
    pub fn from_config(config: HubConfig) -> Result<Self> {
        config.validate()?;

        let mut hub = Self::new(config);
        let devices = hub.config.devices.clone();
        for device in devices {
            hub.add_bot(Arc::new(VacuumBot::new(device)))?;
        }

        info!(bots = hub.bots.len(), "Deebot hub ready");
        Ok(hub)
    }

    /// Manage `bot`; fails if a robot with the same id is already managed
    pub fn add_bot(&mut self, bot: Arc<VacuumBot>) -> Result<()> {
        let did = &bot.device_info().did;
        if self.bot(did).is_some() {
            return Err(SensorError::DuplicateDevice(did.clone()));
        }

        debug!(device = %bot.device_info(), "Managing robot");
        self.bots.push(bot);
        Ok(())
    }

    pub fn vacuum_bots(&self) -> &[Arc<VacuumBot>] {
        &self.bots
    }

    pub fn bot(&self, did: &str) -> Option<&Arc<VacuumBot>> {
        self.bots.iter().find(|bot| bot.device_info().did == did)
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deebot_events::DeviceInfo;

    #[test]
    fn test_from_config() {
        let config = HubConfig::new()
            .with_device(DeviceInfo::new("E0001").with_nick("Downstairs"))
            .with_device(DeviceInfo::new("E0002"));
        let hub = DeebotHub::from_config(config).unwrap();

        assert_eq!(hub.vacuum_bots().len(), 2);
        assert_eq!(
            hub.bot("E0001").map(|bot| bot.device_info().display_name()),
            Some("Downstairs")
        );
        assert!(hub.bot("E0003").is_none());
    }

    #[test]
    fn test_duplicate_bot_is_rejected() {
        let mut hub = DeebotHub::new(HubConfig::default());
        hub.add_bot(Arc::new(VacuumBot::new(DeviceInfo::new("E0001"))))
            .unwrap();

        let result = hub.add_bot(Arc::new(VacuumBot::new(DeviceInfo::new("E0001"))));
        assert!(matches!(result, Err(SensorError::DuplicateDevice(did)) if did == "E0001"));
        assert_eq!(hub.vacuum_bots().len(), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = HubConfig::new()
            .with_device(DeviceInfo::new("E0001"))
            .with_device(DeviceInfo::new("E0001"));
        assert!(matches!(
            DeebotHub::from_config(config),
            Err(SensorError::InvalidConfig(_))
        ));
    }
}
