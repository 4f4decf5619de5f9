//! Remaining life of consumable components

use std::sync::Arc;

use deebot_events::{LifeSpan, LifeSpanEvent, VacuumBot};

use crate::base::{delegate_to_base, BaseSensor};
use crate::entity::{RenderNotifiable, SensorEntity};
use crate::sensors::UNIT_PERCENT;

/// Remaining life of one component, in percent
#[derive(Debug)]
pub struct ComponentSensor {
    base: BaseSensor,
    component: LifeSpan,
}

impl ComponentSensor {
    /// The component's robot identifier doubles as the key
    pub fn new(bot: Arc<VacuumBot>, component: LifeSpan) -> Self {
        let icon = match component {
            LifeSpan::Filter => "mdi:air-filter",
            LifeSpan::Brush | LifeSpan::SideBrush => "mdi:broom",
        };

        Self {
            base: BaseSensor::new(bot, component.as_str())
                .with_icon(Some(icon))
                .with_unit(Some(UNIT_PERCENT)),
            component,
        }
    }

    pub fn component(&self) -> LifeSpan {
        self.component
    }

    pub fn base(&self) -> &BaseSensor {
        &self.base
    }

    pub fn with_enabled_by_default(mut self, enabled: bool) -> Self {
        self.base.set_enabled_by_default(enabled);
        self
    }
}

impl SensorEntity for ComponentSensor {
    delegate_to_base!();

    fn added_to_host(&mut self, notifier: Arc<dyn RenderNotifiable>) {
        self.base.activate(notifier);

        let component = self.component;
        let lifespan = self.base.bot().events().lifespan.clone();
        self.base.listen(&lifespan, move |cell, event: &LifeSpanEvent| {
            if let Some(percent) = event.get(component) {
                cell.set_value(percent);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::*;
    use crate::value::SensorValue;

    #[test]
    fn test_metadata() {
        let bot = test_bot();
        let filter = ComponentSensor::new(Arc::clone(&bot), LifeSpan::Filter);
        let side = ComponentSensor::new(Arc::clone(&bot), LifeSpan::SideBrush);

        assert_eq!(filter.unique_id(), "E0001_heap");
        assert_eq!(filter.icon(), Some("mdi:air-filter"));
        assert_eq!(side.unique_id(), "E0001_sideBrush");
        assert_eq!(side.icon(), Some("mdi:broom"));
        assert_eq!(side.native_unit_of_measurement(), Some("%"));
    }

    #[test]
    fn test_only_own_component_is_read() {
        let bot = test_bot();
        let mut brush = ComponentSensor::new(Arc::clone(&bot), LifeSpan::Brush);
        let mut filter = ComponentSensor::new(Arc::clone(&bot), LifeSpan::Filter);
        brush.added_to_host(RecordingNotifier::new());
        filter.added_to_host(RecordingNotifier::new());

        bot.events()
            .lifespan
            .notify(LifeSpanEvent::new().with(LifeSpan::Brush, 72.5));

        assert_eq!(brush.native_value(), SensorValue::Float(72.5));
        assert!(filter.native_value().is_unknown());
    }

    #[test]
    fn test_zero_percent_is_a_value() {
        let bot = test_bot();
        let mut brush = ComponentSensor::new(Arc::clone(&bot), LifeSpan::Brush);
        brush.added_to_host(RecordingNotifier::new());

        bot.events()
            .lifespan
            .notify(LifeSpanEvent::new().with(LifeSpan::Brush, 0.0));

        assert_eq!(brush.native_value(), SensorValue::Float(0.0));
    }
}
