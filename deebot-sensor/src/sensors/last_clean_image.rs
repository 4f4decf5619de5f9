//! Image of the most recent cleaning run

use std::sync::Arc;

use deebot_events::{CleanLogEvent, VacuumBot};

use crate::base::{delegate_to_base, BaseSensor};
use crate::entity::{RenderNotifiable, SensorEntity};
use crate::value::SensorValue;

pub const KEY: &str = "last_clean_image";

const ICON: &str = "mdi:image-search";

/// URL of the map image from the latest clean log entry
#[derive(Debug)]
pub struct LastCleanImageSensor {
    base: BaseSensor,
}

impl LastCleanImageSensor {
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

impl SensorEntity for LastCleanImageSensor {
    delegate_to_base!();

    fn added_to_host(&mut self, notifier: Arc<dyn RenderNotifiable>) {
        self.base.activate(notifier);

        let clean_logs = self.base.bot().events().clean_logs.clone();
        self.base.listen(&clean_logs, |cell, event: &CleanLogEvent| {
            // An empty log list clears a previously shown image
            match event.latest() {
                Some(entry) => cell.set_value(entry.image_url.as_str()),
                None => cell.set_value(SensorValue::Unknown),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::*;
    use deebot_events::CleanLogEntry;

    #[test]
    fn test_latest_entry_wins() {
        let bot = test_bot();
        let notifier = RecordingNotifier::new();
        let mut sensor = LastCleanImageSensor::new(Arc::clone(&bot));
        sensor.added_to_host(notifier.clone());

        bot.events().clean_logs.notify(CleanLogEvent::new(vec![
            CleanLogEntry::new(1_700_000_200, "https://maps.example/b.png"),
            CleanLogEntry::new(1_700_000_100, "https://maps.example/a.png"),
        ]));

        assert_eq!(
            sensor.native_value(),
            SensorValue::Text("https://maps.example/b.png".to_string())
        );
        assert_eq!(sensor.icon(), Some("mdi:image-search"));
        assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn test_empty_logs_reset_to_unknown() {
        let bot = test_bot();
        let mut sensor = LastCleanImageSensor::new(Arc::clone(&bot));
        sensor.added_to_host(RecordingNotifier::new());

        bot.events()
            .clean_logs
            .notify(CleanLogEvent::new(vec![CleanLogEntry::new(1, "u")]));
        bot.events().clean_logs.notify(CleanLogEvent::new(Vec::new()));

        assert!(sensor.native_value().is_unknown());
    }
}
