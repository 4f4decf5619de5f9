//! Entity State Store
//!
//! Keeps the latest rendered state of every entity a host displays, with
//! change detection and reactive watchers.
//!
//! # Features
//!
//! - **Change Detection**: Only broadcast when a rendered state actually changes
//! - **Per-entity Watchers**: `tokio::sync::watch` receivers for one entity
//! - **Global Change Feed**: `tokio::sync::broadcast` of every change
//!
//! # Quick Start
//!
//! ```rust
//! use entity_store::{EntityState, EntityStore};
//!
//! let store = EntityStore::new();
//! let mut changes = store.subscribe_changes();
//!
//! store.write(EntityState::new("E0001_water_level", "Downstairs_water_level", "high"));
//!
//! let change = changes.try_recv().unwrap();
//! assert_eq!(change.unique_id, "E0001_water_level");
//! assert_eq!(store.get("E0001_water_level").unwrap().state, "high");
//! ```

pub mod event;
pub mod state;
pub mod store;

pub use event::StateChanged;
pub use state::{EntityState, STATE_UNKNOWN};
pub use store::{EntityStore, DEFAULT_CHANGE_CAPACITY};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::event::StateChanged;
    pub use crate::state::{EntityState, STATE_UNKNOWN};
    pub use crate::store::EntityStore;
}
