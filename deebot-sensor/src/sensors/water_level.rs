//! Mop water amount

use std::sync::Arc;

use deebot_events::{VacuumBot, WaterInfoEvent};

use crate::base::{delegate_to_base, BaseSensor};
use crate::entity::{RenderNotifiable, SensorEntity};

pub const KEY: &str = "water_level";

const ICON: &str = "mdi:water";

/// Configured water amount, as `low`, `medium`, `high` or `ultrahigh`
#[derive(Debug)]
pub struct WaterLevelSensor {
    base: BaseSensor,
}

impl WaterLevelSensor {
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

impl SensorEntity for WaterLevelSensor {
    delegate_to_base!();

    fn added_to_host(&mut self, notifier: Arc<dyn RenderNotifiable>) {
        self.base.activate(notifier);

        let water_info = self.base.bot().events().water_info.clone();
        self.base.listen(&water_info, |cell, event: &WaterInfoEvent| {
            // Mop-only updates carry no amount
            if let Some(amount) = event.amount {
                cell.set_value(amount.as_str());
            }
        });
    }
}
