//! Deebot sensors
//!
//! Read-only sensor entities that mirror a Deebot robot's event streams.
//! Each sensor subscribes to one stream, copies one field of every event
//! into its value and asks the host to re-render.
//!
//! # Architecture
//!
//! ```text
//! VacuumBot (deebot-events)
//!     │  EventEmitter<E>::notify
//!     ▼
//! SensorEntity (this crate)
//!     │  BaseSensor: status reset, value cell, listeners
//!     │  variant: field extraction, unit conversion
//!     ▼
//! RenderNotifiable::write_state
//!     ▼
//! EntityStore (entity-store)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use deebot_sensor::prelude::*;
//!
//! let hub = DeebotHub::from_config(
//!     HubConfig::new().with_device(DeviceInfo::new("E0001").with_nick("Downstairs")),
//! )?;
//!
//! let platform = EntityPlatform::new();
//! let count = setup_entry(&hub, &platform);
//! assert_eq!(count, 14);
//!
//! let bot = hub.bot("E0001").unwrap();
//! bot.events()
//!     .total_stats
//!     .notify(TotalStatsEvent::new(1200, 7200, 3));
//!
//! let time = platform.store().get("E0001_stats_total_time").unwrap();
//! assert_eq!(time.state, "2");
//! assert_eq!(time.unit_of_measurement.as_deref(), Some("h"));
//! # Ok::<(), deebot_sensor::SensorError>(())
//! ```

// Host contract
pub mod entity;
pub mod value;

// Shared sensor plumbing
pub mod base;

// Per-metric sensors
pub mod sensors;

// Catalog and context
pub mod config;
pub mod hub;
pub mod setup;

// Reference host
pub mod platform;

// Error types
pub mod error;

// Logging infrastructure
pub mod logging;

// ============================================================================
// Re-exports
// ============================================================================

pub use base::{BaseSensor, SensorCell, SensorDescription, SensorState};
pub use config::HubConfig;
pub use entity::{AddEntities, DeviceRegistryInfo, RenderNotifiable, SensorEntity};
pub use hub::DeebotHub;
pub use platform::{EntityPlatform, RegistryEntry};
pub use sensors::{
    ComponentSensor, LastCleanImageSensor, LastErrorSensor, RoomSensor, StatsAttribute,
    StatsSensor, StatsType, WaterLevelSensor,
};
pub use setup::{build_sensors, setup_entry};
pub use value::SensorValue;

pub use error::{Result, SensorError};

pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::HubConfig;
    pub use crate::entity::{AddEntities, RenderNotifiable, SensorEntity};
    pub use crate::hub::DeebotHub;
    pub use crate::platform::EntityPlatform;
    pub use crate::sensors::*;
    pub use crate::setup::setup_entry;
    pub use crate::value::SensorValue;

    pub use deebot_events::prelude::*;
    pub use entity_store::{EntityState, EntityStore};
}
