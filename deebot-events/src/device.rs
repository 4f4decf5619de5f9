//! Device identity and the per-device event hub

use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::emitter::EventEmitter;
use crate::events::{
    CleanLogEvent, ErrorEvent, LifeSpanEvent, Room, StatsEvent, StatusEvent, TotalStatsEvent,
    WaterInfoEvent,
};

/// Identity of a robot as reported by the cloud account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device id
    pub did: String,
    /// User-assigned nickname
    #[serde(default)]
    pub nick: Option<String>,
    /// Model name, e.g. "DEEBOT OZMO 950"
    #[serde(default, rename = "deviceName")]
    pub device_name: Option<String>,
}

impl DeviceInfo {
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            nick: None,
            device_name: None,
        }
    }

    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    pub fn with_device_name(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }

    /// Nickname if one is set, otherwise the device id
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.did)
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.did)
    }
}

/// All event streams of one robot
#[derive(Debug, Clone)]
pub struct EventHub {
    pub status: EventEmitter<StatusEvent>,
    pub clean_logs: EventEmitter<CleanLogEvent>,
    pub water_info: EventEmitter<WaterInfoEvent>,
    pub lifespan: EventEmitter<LifeSpanEvent>,
    pub stats: EventEmitter<StatsEvent>,
    pub total_stats: EventEmitter<TotalStatsEvent>,
    pub error: EventEmitter<ErrorEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            status: EventEmitter::new("status"),
            clean_logs: EventEmitter::new("clean_logs"),
            water_info: EventEmitter::new("water_info"),
            lifespan: EventEmitter::new("lifespan"),
            stats: EventEmitter::new("stats"),
            total_stats: EventEmitter::new("total_stats"),
            error: EventEmitter::new("error"),
        }
    }

    /// Total number of listeners across every stream
    pub fn listener_count(&self) -> usize {
        self.status.listener_count()
            + self.clean_logs.listener_count()
            + self.water_info.listener_count()
            + self.lifespan.listener_count()
            + self.stats.listener_count()
            + self.total_stats.listener_count()
            + self.error.listener_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one robot: its identity, its event streams and its saved rooms
pub struct VacuumBot {
    device_info: DeviceInfo,
    events: EventHub,
    rooms: RwLock<Vec<Room>>,
}

impl VacuumBot {
    pub fn new(device_info: DeviceInfo) -> Self {
        Self::with_events(device_info, EventHub::new())
    }

    /// Create a bot around an existing hub, e.g. one whose emitters carry refresh hooks
    pub fn with_events(device_info: DeviceInfo, events: EventHub) -> Self {
        Self {
            device_info,
            events,
            rooms: RwLock::new(Vec::new()),
        }
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Rooms currently saved on the map
    pub fn rooms(&self) -> Vec<Room> {
        self.rooms.read().clone()
    }

    /// Replace the saved rooms, as reported by the robot's map
    pub fn set_rooms(&self, rooms: Vec<Room>) {
        debug!(did = %self.device_info.did, count = rooms.len(), "Updating saved rooms");
        *self.rooms.write() = rooms;
    }

    /// Distinct room types on the map, in first-seen order
    pub fn room_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for room in self.rooms.read().iter() {
            if !types.contains(&room.subtype) {
                types.push(room.subtype.clone());
            }
        }
        types
    }
}

impl fmt::Debug for VacuumBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VacuumBot")
            .field("device_info", &self.device_info)
            .field("room_count", &self.rooms.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Subscribable;

    #[test]
    fn test_display_name_prefers_nick() {
        let info = DeviceInfo::new("E0001").with_nick("Kitchen bot");
        assert_eq!(info.display_name(), "Kitchen bot");

        let anonymous = DeviceInfo::new("E0002");
        assert_eq!(anonymous.display_name(), "E0002");
    }

    #[test]
    fn test_device_info_deserialize() {
        let info: DeviceInfo =
            serde_json::from_str(r#"{"did": "E0001", "deviceName": "DEEBOT OZMO 950"}"#).unwrap();

        assert_eq!(info.did, "E0001");
        assert_eq!(info.nick, None);
        assert_eq!(info.device_name.as_deref(), Some("DEEBOT OZMO 950"));
    }

    #[test]
    fn test_room_types_are_distinct_in_first_seen_order() {
        let bot = VacuumBot::new(DeviceInfo::new("E0001"));
        bot.set_rooms(vec![
            Room::new(0, "Kitchen"),
            Room::new(1, "Bedroom"),
            Room::new(2, "Kitchen"),
            Room::new(3, "Living Room"),
        ]);

        assert_eq!(bot.room_types(), vec!["Kitchen", "Bedroom", "Living Room"]);
        assert_eq!(bot.rooms().len(), 4);
    }

    #[test]
    fn test_hub_listener_count() {
        let bot = VacuumBot::new(DeviceInfo::new("E0001"));
        assert_eq!(bot.events().listener_count(), 0);

        let _status = bot.events().status.subscribe(|_: &StatusEvent| {});
        let _error = bot.events().error.subscribe(|_: &ErrorEvent| {});
        assert_eq!(bot.events().listener_count(), 2);
    }
}
