//! Deebot device events
//!
//! Typed event payloads for Deebot vacuum robots and the listener plumbing
//! that delivers them.
//!
//! # Architecture
//!
//! ```text
//! VacuumBot
//!     ├── device_info: DeviceInfo
//!     ├── events: EventHub
//!     │       ├── status       EventEmitter<StatusEvent>
//!     │       ├── clean_logs   EventEmitter<CleanLogEvent>
//!     │       ├── water_info   EventEmitter<WaterInfoEvent>
//!     │       ├── lifespan     EventEmitter<LifeSpanEvent>
//!     │       ├── stats        EventEmitter<StatsEvent>
//!     │       ├── total_stats  EventEmitter<TotalStatsEvent>
//!     │       └── error        EventEmitter<ErrorEvent>
//!     └── rooms: Vec<Room>     (synchronous query)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use deebot_events::{DeviceInfo, StatusEvent, Subscribable, VacuumBot};
//!
//! let bot = VacuumBot::new(DeviceInfo::new("E0001").with_nick("Downstairs"));
//!
//! let listener = bot.events().status.subscribe(|event: &StatusEvent| {
//!     println!("available: {}", event.available);
//! });
//!
//! bot.events().status.notify(StatusEvent::unavailable());
//! drop(listener);
//! ```

pub mod device;
pub mod emitter;
pub mod events;

pub use device::{DeviceInfo, EventHub, VacuumBot};
pub use emitter::{Callback, EventEmitter, EventListener, ListenerId, RefreshHook, Subscribable};
pub use events::{
    CleanLogEntry, CleanLogEvent, ErrorEvent, LifeSpan, LifeSpanEvent, Room, StatsEvent,
    StatusEvent, TotalStatsEvent, WaterAmount, WaterInfoEvent,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::device::{DeviceInfo, EventHub, VacuumBot};
    pub use crate::emitter::{EventEmitter, EventListener, Subscribable};
    pub use crate::events::*;
}
