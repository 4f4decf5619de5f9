//! Last error reported by the robot

use std::sync::Arc;

use serde_json::Value;

use deebot_events::{ErrorEvent, VacuumBot};

use crate::base::{delegate_to_base, BaseSensor};
use crate::entity::{RenderNotifiable, SensorEntity};
use crate::value::SensorValue;

pub const KEY: &str = "last_error";

/// Attribute holding the error's human-readable description
pub const ATTR_DESCRIPTION: &str = "description";

const ICON: &str = "mdi:alert-circle";

/// Error code, with its description as an attribute
#[derive(Debug)]
pub struct LastErrorSensor {
    base: BaseSensor,
}

impl LastErrorSensor {
    pub fn new(bot: Arc<VacuumBot>) -> Self {
        Self {
            base: BaseSensor::new(bot, KEY).with_icon(Some(ICON)),
        }
    }

    pub fn base(&self) -> &BaseSensor {
        &self.base
    }

    pub fn with_enabled_by_default(mut self, enabled: bool) -> Self {
        self.base.set_enabled_by_default(enabled);
        self
    }
}

impl SensorEntity for LastErrorSensor {
    delegate_to_base!();

    fn added_to_host(&mut self, notifier: Arc<dyn RenderNotifiable>) {
        self.base.activate(notifier);

        let error = self.base.bot().events().error.clone();
        self.base.listen(&error, |cell, event: &ErrorEvent| {
            let description = event
                .description
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null);

            cell.update(|state| {
                state.value = SensorValue::from(event.code);
                state
                    .attributes
                    .insert(ATTR_DESCRIPTION.to_string(), description);
            });
        });
    }
}
