//! Rendered entity state
//!
//! An `EntityState` is what the host shows for one entity at one moment:
//! the state string plus its display metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// State string used while an entity has no known value
pub const STATE_UNKNOWN: &str = "unknown";

/// Snapshot of an entity as rendered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub unique_id: String,
    pub name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl EntityState {
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            state: state.into(),
            attributes: BTreeMap::new(),
            unit_of_measurement: None,
            icon: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measurement = Some(unit.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.state == STATE_UNKNOWN
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let state = EntityState::new("E1_last_error", "bot_last_error", "5")
            .with_attribute("description", "stuck")
            .with_icon("mdi:alert-circle");

        assert_eq!(state.attribute("description"), Some(&json!("stuck")));
        assert_eq!(state.icon.as_deref(), Some("mdi:alert-circle"));
        assert!(!state.is_unknown());
    }

    #[test]
    fn test_serialize_skips_empty_metadata() {
        let state = EntityState::new("E1_stats_cid", "bot_stats_cid", STATE_UNKNOWN);
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(
            json,
            json!({"unique_id": "E1_stats_cid", "name": "bot_stats_cid", "state": "unknown"})
        );
        assert!(state.is_unknown());
    }
}
