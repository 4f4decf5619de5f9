//! State change notifications
//!
//! The store broadcasts a `StateChanged` whenever the rendered state of an
//! entity actually differs from what it held before.

use std::time::Instant;

use crate::state::EntityState;

/// A change to one entity's rendered state
///
/// `old_state` is `None` for the first write; `new_state` is `None` when the
/// entity was removed.
#[derive(Debug, Clone)]
pub struct StateChanged {
    pub unique_id: String,
    pub old_state: Option<EntityState>,
    pub new_state: Option<EntityState>,
    pub timestamp: Instant,
}

impl StateChanged {
    pub fn new(
        unique_id: impl Into<String>,
        old_state: Option<EntityState>,
        new_state: Option<EntityState>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            old_state,
            new_state,
            timestamp: Instant::now(),
        }
    }

    /// Whether this change removed the entity
    pub fn is_removal(&self) -> bool {
        self.new_state.is_none()
    }

    /// Whether this change is the entity's first appearance
    pub fn is_addition(&self) -> bool {
        self.old_state.is_none() && self.new_state.is_some()
    }
}

impl PartialEq for StateChanged {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.unique_id == other.unique_id
            && self.old_state == other.old_state
            && self.new_state == other.new_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition_and_removal() {
        let state = EntityState::new("E1_water_level", "bot_water_level", "low");

        let added = StateChanged::new("E1_water_level", None, Some(state.clone()));
        assert!(added.is_addition());
        assert!(!added.is_removal());

        let removed = StateChanged::new("E1_water_level", Some(state), None);
        assert!(removed.is_removal());
        assert!(!removed.is_addition());
    }

    #[test]
    fn test_equality_ignores_timestamp() {
        let a = StateChanged::new("id", None, None);
        std::thread::sleep(std::time::Duration::from_millis(1));
        let b = StateChanged::new("id", None, None);
        assert_eq!(a, b);
    }
}
