//! Sensor catalog
//!
//! Builds every sensor for every managed robot and hands them to the host
//! in one batch. The catalog does not change afterwards.

use std::sync::Arc;

use tracing::{debug, info};

use deebot_events::{LifeSpan, VacuumBot};

use crate::config::HubConfig;
use crate::entity::{AddEntities, SensorEntity};
use crate::hub::DeebotHub;
use crate::sensors::room::group_by_slug;
use crate::sensors::{
    ComponentSensor, LastCleanImageSensor, LastErrorSensor, RoomSensor, StatsAttribute,
    StatsSensor, StatsType, WaterLevelSensor, UNIT_HOURS, UNIT_MINUTES, UNIT_SQUARE_METERS,
};

const ICON_AREA: &str = "mdi:floor-plan";
const ICON_TIME: &str = "mdi:timer-outline";

/// `(attribute, icon, unit)` for cleaning statistics, in registration order
const CLEANING_STATS: [(StatsAttribute, Option<&str>, Option<&str>); 5] = [
    (StatsAttribute::Area, Some(ICON_AREA), Some(UNIT_SQUARE_METERS)),
    (StatsAttribute::Time, Some(ICON_TIME), Some(UNIT_MINUTES)),
    (StatsAttribute::Type, Some("mdi:cog"), None),
    (StatsAttribute::Cid, None, None),
    (StatsAttribute::Start, None, None),
];

/// `(attribute, icon, unit)` for lifetime totals, in registration order
const TOTAL_STATS: [(StatsAttribute, Option<&str>, Option<&str>); 3] = [
    (StatsAttribute::Area, Some(ICON_AREA), Some(UNIT_SQUARE_METERS)),
    (StatsAttribute::Time, Some(ICON_TIME), Some(UNIT_HOURS)),
    (StatsAttribute::Cleanings, Some("mdi:counter"), None),
];

/// Every sensor for one robot
pub fn build_sensors(bot: &Arc<VacuumBot>, config: &HubConfig) -> Vec<Box<dyn SensorEntity>> {
    let enabled = config.entity_registry_enabled_default;
    let mut sensors: Vec<Box<dyn SensorEntity>> = vec![
        Box::new(LastCleanImageSensor::new(Arc::clone(bot)).with_enabled_by_default(enabled)),
        Box::new(WaterLevelSensor::new(Arc::clone(bot)).with_enabled_by_default(enabled)),
        Box::new(LastErrorSensor::new(Arc::clone(bot)).with_enabled_by_default(enabled)),
    ];

    for component in LifeSpan::all() {
        sensors.push(Box::new(
            ComponentSensor::new(Arc::clone(bot), component).with_enabled_by_default(enabled),
        ));
    }

    let stats = CLEANING_STATS
        .iter()
        .map(|entry| (StatsType::Cleaning, entry))
        .chain(TOTAL_STATS.iter().map(|entry| (StatsType::Total, entry)));
    for (stats_type, &(attribute, icon, unit)) in stats {
        sensors.push(Box::new(
            StatsSensor::new(Arc::clone(bot), stats_type, attribute, icon, unit)
                .with_enabled_by_default(enabled),
        ));
    }

    if config.legacy_room_sensors {
        for room_types in group_by_slug(bot.room_types()) {
            sensors.push(Box::new(
                RoomSensor::for_room_types(Arc::clone(bot), room_types)
                    .with_enabled_by_default(enabled),
            ));
        }
    }

    debug!(
        device = %bot.device_info(),
        sensors = sensors.len(),
        "Built sensor catalog"
    );
    sensors
}

/// Register the sensors of every robot managed by `hub`
///
/// Returns the number of sensors handed to the host.
pub fn setup_entry(hub: &DeebotHub, add_entities: &dyn AddEntities) -> usize {
    let sensors: Vec<Box<dyn SensorEntity>> = hub
        .vacuum_bots()
        .iter()
        .flat_map(|bot| build_sensors(bot, hub.config()))
        .collect();

    let count = sensors.len();
    if count > 0 {
        add_entities.add_entities(sensors);
    }

    info!(
        bots = hub.vacuum_bots().len(),
        sensors = count,
        "Deebot sensors set up"
    );
    count
}
