//! In-process host for Deebot sensors
//!
//! [`EntityPlatform`] accepts sensors through [`AddEntities`], keeps a
//! registry record for each, activates them against an [`EntityStore`] and
//! polls the ones that ask for it.
//!
//! # Example
//!
//! ```rust
//! use deebot_sensor::prelude::*;
//!
//! let hub = DeebotHub::from_config(
//!     HubConfig::new().with_device(DeviceInfo::new("E0001").with_nick("Downstairs")),
//! )?;
//! let platform = EntityPlatform::new();
//! setup_entry(&hub, &platform);
//!
//! let bot = hub.bot("E0001").unwrap();
//! bot.events().error.notify(ErrorEvent::new(5, Some("stuck")));
//!
//! let state = platform.store().get("E0001_last_error").unwrap();
//! assert_eq!(state.state, "5");
//! # Ok::<(), deebot_sensor::SensorError>(())
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use entity_store::{EntityState, EntityStore};

use crate::entity::{AddEntities, DeviceRegistryInfo, RenderNotifiable, SensorEntity};

/// Registry record kept for every accepted sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub unique_id: String,
    pub name: String,
    pub enabled_by_default: bool,
    pub device_info: Option<DeviceRegistryInfo>,
}

impl RegistryEntry {
    fn for_entity(entity: &dyn SensorEntity) -> Self {
        Self {
            unique_id: entity.unique_id().to_string(),
            name: entity.name().to_string(),
            enabled_by_default: entity.entity_registry_enabled_default(),
            device_info: entity.device_info(),
        }
    }
}

/// Writes rendered states into a store
struct StoreNotifier {
    store: EntityStore,
}

impl RenderNotifiable for StoreNotifier {
    fn write_state(&self, state: EntityState) {
        self.store.write(state);
    }
}

/// Host side of the sensor contract
pub struct EntityPlatform {
    store: EntityStore,
    entities: Mutex<Vec<Box<dyn SensorEntity>>>,
    registry: RwLock<Vec<RegistryEntry>>,
}

impl EntityPlatform {
    pub fn new() -> Self {
        Self::with_store(EntityStore::new())
    }

    /// Render into an existing store
    pub fn with_store(store: EntityStore) -> Self {
        Self {
            store,
            entities: Mutex::new(Vec::new()),
            registry: RwLock::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Registry records, in registration order
    pub fn registry(&self) -> Vec<RegistryEntry> {
        self.registry.read().clone()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.lock().len()
    }

    /// Call `update` on every sensor that asks to be polled
    ///
    /// Returns the number of sensors polled.
    pub fn update_polled(&self) -> usize {
        let mut entities = self.entities.lock();
        let mut polled = 0;

        for entity in entities.iter_mut().filter(|entity| entity.should_poll()) {
            entity.update();
            polled += 1;
        }

        debug!(polled, "Polled sensors");
        polled
    }

    /// Tear every sensor down and drop its state
    ///
    /// Calling it again is a no-op.
    pub fn unload(&self) {
        let entities: Vec<Box<dyn SensorEntity>> = self.entities.lock().drain(..).collect();
        if entities.is_empty() {
            return;
        }

        for mut entity in entities {
            entity.will_remove_from_host();
            self.store.remove(entity.unique_id());
        }
        let removed = std::mem::take(&mut *self.registry.write()).len();

        info!(removed, "Unloaded Deebot sensors");
    }
}

impl AddEntities for EntityPlatform {
    fn add_entities(&self, new_entities: Vec<Box<dyn SensorEntity>>) {
        let notifier: Arc<dyn RenderNotifiable> = Arc::new(StoreNotifier {
            store: self.store.clone(),
        });

        let mut entities = self.entities.lock();
        let mut known: HashSet<String> = entities
            .iter()
            .map(|entity| entity.unique_id().to_string())
            .collect();
        let mut added = 0;

        for mut entity in new_entities {
            if !known.insert(entity.unique_id().to_string()) {
                warn!(
                    unique_id = %entity.unique_id(),
                    "Sensor with this unique id already exists, skipping"
                );
                continue;
            }

            self.registry
                .write()
                .push(RegistryEntry::for_entity(entity.as_ref()));

            entity.added_to_host(Arc::clone(&notifier));
            self.store.write(entity.state());

            entities.push(entity);
            added += 1;
        }

        info!(added, total = entities.len(), "Registered sensors");
    }
}

impl Default for EntityPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityPlatform")
            .field("entities", &self.entity_count())
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::test_bot;
    use crate::sensors::{LastErrorSensor, RoomSensor, WaterLevelSensor};
    use deebot_events::{ErrorEvent, Room, StatusEvent, WaterAmount, WaterInfoEvent};

    #[test]
    fn test_initial_state_is_unknown() {
        let bot = test_bot();
        let platform = EntityPlatform::new();
        platform.add_entities(vec![Box::new(WaterLevelSensor::new(bot))]);

        let state = platform.store().get("E0001_water_level").unwrap();
        assert!(state.is_unknown());
        assert_eq!(state.name, "Downstairs_water_level");
        assert_eq!(state.icon.as_deref(), Some("mdi:water"));
    }

    #[test]
    fn test_events_reach_store() {
        let bot = test_bot();
        let platform = EntityPlatform::new();
        platform.add_entities(vec![
            Box::new(WaterLevelSensor::new(Arc::clone(&bot))),
            Box::new(LastErrorSensor::new(Arc::clone(&bot))),
        ]);

        bot.events()
            .water_info
            .notify(WaterInfoEvent::with_amount(WaterAmount::High));
        bot.events().error.notify(ErrorEvent::new(102, Some("wheel stuck")));

        assert_eq!(platform.store().get("E0001_water_level").unwrap().state, "high");
        let error = platform.store().get("E0001_last_error").unwrap();
        assert_eq!(error.state, "102");
        assert_eq!(
            error.attribute("description"),
            Some(&serde_json::Value::from("wheel stuck"))
        );

        bot.events().status.notify(StatusEvent::unavailable());
        assert!(platform.store().get("E0001_water_level").unwrap().is_unknown());
    }

    #[test]
    fn test_duplicate_unique_id_is_skipped() {
        let bot = test_bot();
        let platform = EntityPlatform::new();
        platform.add_entities(vec![
            Box::new(WaterLevelSensor::new(Arc::clone(&bot))),
            Box::new(WaterLevelSensor::new(Arc::clone(&bot))),
        ]);
        platform.add_entities(vec![Box::new(WaterLevelSensor::new(Arc::clone(&bot)))]);

        assert_eq!(platform.entity_count(), 1);
        assert_eq!(platform.registry().len(), 1);
        assert_eq!(bot.events().water_info.listener_count(), 1);
    }

    #[test]
    fn test_registry_entry() {
        let bot = test_bot();
        let platform = EntityPlatform::new();
        platform.add_entities(vec![Box::new(LastErrorSensor::new(bot))]);

        let registry = platform.registry();
        assert_eq!(registry[0].unique_id, "E0001_last_error");
        assert!(!registry[0].enabled_by_default);
        assert_eq!(
            registry[0].device_info.as_ref().map(|info| info.name.as_str()),
            Some("Downstairs")
        );
    }

    #[test]
    fn test_update_polled() {
        let bot = test_bot();
        bot.set_rooms(vec![Room::new(1, "Kitchen")]);

        let platform = EntityPlatform::new();
        platform.add_entities(vec![
            Box::new(RoomSensor::new(Arc::clone(&bot), "Kitchen")),
            Box::new(WaterLevelSensor::new(Arc::clone(&bot))),
        ]);
        assert_eq!(platform.store().get("E0001_room_kitchen").unwrap().state, "1");

        bot.set_rooms(vec![Room::new(1, "Kitchen"), Room::new(5, "Kitchen")]);
        assert_eq!(platform.update_polled(), 1);
        assert_eq!(platform.store().get("E0001_room_kitchen").unwrap().state, "1,5");
    }

    #[test]
    fn test_unload() {
        let bot = test_bot();
        let platform = EntityPlatform::new();
        platform.add_entities(vec![Box::new(WaterLevelSensor::new(Arc::clone(&bot)))]);

        platform.unload();
        assert_eq!(platform.entity_count(), 0);
        assert!(platform.store().is_empty());
        assert_eq!(bot.events().listener_count(), 0);

        // Still torn down; nothing reaches the store
        bot.events()
            .water_info
            .notify(WaterInfoEvent::with_amount(WaterAmount::Low));
        assert!(platform.store().get("E0001_water_level").is_none());

        platform.unload();
    }
}
