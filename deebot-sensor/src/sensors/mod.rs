//! Per-metric sensors
//!
//! Each sensor wraps a [`BaseSensor`](crate::base::BaseSensor), subscribes to
//! one device stream on activation and copies one field of every event into
//! its value.
//!
//! | Sensor | Stream |
//! |---|---|
//! | [`LastCleanImageSensor`] | `clean_logs` |
//! | [`WaterLevelSensor`] | `water_info` |
//! | [`ComponentSensor`] | `lifespan` |
//! | [`StatsSensor`] | `stats` / `total_stats` |
//! | [`LastErrorSensor`] | `error` |
//! | [`RoomSensor`] | none, polled |

pub mod component;
pub mod last_clean_image;
pub mod last_error;
pub mod room;
pub mod stats;
pub mod water_level;

pub use component::ComponentSensor;
pub use last_clean_image::LastCleanImageSensor;
pub use last_error::LastErrorSensor;
pub use room::RoomSensor;
pub use stats::{StatsAttribute, StatsSensor, StatsType};
pub use water_level::WaterLevelSensor;

/// Square metres
pub const UNIT_SQUARE_METERS: &str = "m²";
/// Minutes
pub const UNIT_MINUTES: &str = "min";
/// Hours
pub const UNIT_HOURS: &str = "h";
/// Percent
pub const UNIT_PERCENT: &str = "%";
