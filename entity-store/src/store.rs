//! Entity state store with reactive watchers
//!
//! Each entity gets a `tokio::sync::watch` channel holding its latest
//! rendered state. Writes that do not change the state are absorbed; real
//! changes are also broadcast to every `subscribe_changes()` receiver.
//!
//! ```text
//! EntityStore
//! ├── entities: HashMap<unique_id, watch::Sender<Option<EntityState>>>
//! └── changes_tx: broadcast::Sender<StateChanged>
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{broadcast, watch};
use tracing::trace;

use crate::event::StateChanged;
use crate::state::EntityState;

/// Default capacity of the change broadcast channel
pub const DEFAULT_CHANGE_CAPACITY: usize = 1000;

/// Latest rendered state of every entity
///
/// Cloning the store yields another handle onto the same states.
#[derive(Clone)]
pub struct EntityStore {
    entities: Arc<RwLock<HashMap<String, watch::Sender<Option<EntityState>>>>>,
    changes_tx: broadcast::Sender<StateChanged>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANGE_CAPACITY)
    }

    /// Create a store whose change channel buffers `capacity` events per receiver
    pub fn with_capacity(capacity: usize) -> Self {
        let (changes_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
            changes_tx,
        }
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Current state of an entity
    pub fn get(&self, unique_id: &str) -> Option<EntityState> {
        self.entities.read().get(unique_id)?.borrow().clone()
    }

    /// Whether an entity currently has a state
    pub fn contains(&self, unique_id: &str) -> bool {
        self.get(unique_id).is_some()
    }

    /// Ids of all entities with a state, sorted
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entities
            .read()
            .iter()
            .filter(|(_, tx)| tx.borrow().is_some())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entities
            .read()
            .values()
            .filter(|tx| tx.borrow().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Watching
    // ========================================================================

    /// Watch one entity's state
    ///
    /// The receiver starts with the current state (or `None`) and is marked
    /// changed on every real change. The slot is created if the entity has
    /// not been written yet.
    pub fn watch(&self, unique_id: &str) -> watch::Receiver<Option<EntityState>> {
        let mut entities = self.entities.write();
        entities
            .entry(unique_id.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }

    /// Receive every state change in the store
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StateChanged> {
        self.changes_tx.subscribe()
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Record an entity's rendered state, returning whether it changed
    pub fn write(&self, state: EntityState) -> bool {
        let unique_id = state.unique_id.clone();

        let old_state = {
            let mut entities = self.entities.write();
            let tx = entities
                .entry(unique_id.clone())
                .or_insert_with(|| watch::channel(None).0);

            let old_state = tx.borrow().clone();
            if old_state.as_ref() == Some(&state) {
                trace!(unique_id = %unique_id, "State unchanged");
                return false;
            }

            // send_replace() updates the value even with no receivers
            tx.send_replace(Some(state.clone()));
            old_state
        };

        trace!(unique_id = %unique_id, state = %state.state, "State changed");
        let _ = self
            .changes_tx
            .send(StateChanged::new(unique_id, old_state, Some(state)));
        true
    }

    /// Remove an entity's state, returning whether it had one
    ///
    /// Watchers observe `None`; a removal change is broadcast.
    pub fn remove(&self, unique_id: &str) -> bool {
        let old_state = {
            let mut entities = self.entities.write();
            let Some(tx) = entities.remove(unique_id) else {
                return false;
            };
            tx.send_replace(None)
        };

        match old_state {
            Some(old) => {
                let _ = self
                    .changes_tx
                    .send(StateChanged::new(unique_id, Some(old), None));
                true
            }
            None => false,
        }
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("entity_count", &self.len())
            .finish()
    }
}
