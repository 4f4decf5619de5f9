//! Host-facing entity contract
//!
//! These traits are the seam between the sensors and whatever host displays
//! them:
//!
//! - [`SensorEntity`]: what the host can ask a sensor
//! - [`RenderNotifiable`]: how a sensor asks the host to re-render
//! - [`AddEntities`]: how sensors are handed to the host

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use deebot_events::VacuumBot;
use entity_store::EntityState;

use crate::value::SensorValue;

/// Integration domain used in device registry identifiers
pub const DOMAIN: &str = "deebot";

/// Manufacturer reported for every robot
pub const MANUFACTURER: &str = "Ecovacs";

/// Receives rendered states from sensors
///
/// Sensors call `write_state` after every value mutation.
pub trait RenderNotifiable: Send + Sync {
    fn write_state(&self, state: EntityState);
}

impl<F> RenderNotifiable for F
where
    F: Fn(EntityState) + Send + Sync,
{
    fn write_state(&self, state: EntityState) {
        self(state)
    }
}

/// Device registry information shared by every sensor of one robot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistryInfo {
    /// `(domain, device id)` pairs
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub model: Option<String>,
}

impl DeviceRegistryInfo {
    pub fn for_bot(bot: &VacuumBot) -> Self {
        let info = bot.device_info();
        Self {
            identifiers: vec![(DOMAIN.to_string(), info.did.clone())],
            name: info.display_name().to_string(),
            manufacturer: MANUFACTURER.to_string(),
            model: info.device_name.clone(),
        }
    }
}

/// A read-only sensor as seen by the host
pub trait SensorEntity: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Globally unique identifier
    fn unique_id(&self) -> &str;

    /// Last-known value
    fn native_value(&self) -> SensorValue;

    fn native_unit_of_measurement(&self) -> Option<&str> {
        None
    }

    fn icon(&self) -> Option<&str> {
        None
    }

    /// Auxiliary display attributes
    fn extra_state_attributes(&self) -> BTreeMap<String, Value> {
        BTreeMap::new()
    }

    fn device_info(&self) -> Option<DeviceRegistryInfo> {
        None
    }

    /// Whether the host should call [`update`](Self::update) periodically
    fn should_poll(&self) -> bool {
        false
    }

    /// Whether the host registry should enable the entity on first sight
    fn entity_registry_enabled_default(&self) -> bool {
        false
    }

    /// Called once the host is ready; sensors subscribe to their streams here
    fn added_to_host(&mut self, notifier: Arc<dyn RenderNotifiable>);

    /// Called when the host tears the sensor down
    ///
    /// Must be safe to call repeatedly and without a prior activation.
    fn will_remove_from_host(&mut self);

    /// Refresh a polled sensor
    fn update(&mut self) {}

    /// Current rendered state
    fn state(&self) -> EntityState {
        EntityState {
            unique_id: self.unique_id().to_string(),
            name: self.name().to_string(),
            state: self.native_value().to_state_string(),
            attributes: self.extra_state_attributes(),
            unit_of_measurement: self.native_unit_of_measurement().map(str::to_string),
            icon: self.icon().map(str::to_string),
        }
    }
}

/// Registration call accepting a batch of sensors
pub trait AddEntities {
    fn add_entities(&self, entities: Vec<Box<dyn SensorEntity>>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use deebot_events::DeviceInfo;
    use parking_lot::Mutex;

    #[test]
    fn test_device_registry_info() {
        let bot = VacuumBot::new(
            DeviceInfo::new("E0001")
                .with_nick("Downstairs")
                .with_device_name("DEEBOT OZMO 950"),
        );
        let info = DeviceRegistryInfo::for_bot(&bot);

        assert_eq!(info.identifiers, vec![("deebot".to_string(), "E0001".to_string())]);
        assert_eq!(info.name, "Downstairs");
        assert_eq!(info.manufacturer, "Ecovacs");
        assert_eq!(info.model.as_deref(), Some("DEEBOT OZMO 950"));
    }

    #[test]
    fn test_closure_is_a_notifier() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let notifier: Arc<dyn RenderNotifiable> =
            Arc::new(move |state: EntityState| sink.lock().push(state.state));

        notifier.write_state(EntityState::new("id", "name", "1"));
        assert_eq!(*seen.lock(), vec!["1".to_string()]);
    }

    struct FixedSensor;

    impl SensorEntity for FixedSensor {
        fn name(&self) -> &str {
            "fixed"
        }

        fn unique_id(&self) -> &str {
            "fixed_1"
        }

        fn native_value(&self) -> SensorValue {
            SensorValue::Int(1)
        }

        fn added_to_host(&mut self, _notifier: Arc<dyn RenderNotifiable>) {}

        fn will_remove_from_host(&mut self) {}
    }

    #[test]
    fn test_trait_defaults() {
        let sensor = FixedSensor;
        assert!(!sensor.entity_registry_enabled_default());
        assert!(!sensor.should_poll());
        assert!(sensor.device_info().is_none());

        let state = sensor.state();
        assert_eq!(state.unique_id, "fixed_1");
        assert_eq!(state.state, "1");
        assert!(state.attributes.is_empty());
    }
}
