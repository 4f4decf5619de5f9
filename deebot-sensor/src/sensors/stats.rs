//! Cleaning statistics
//!
//! One sensor per (statistics type, attribute) pair. Cleaning statistics
//! describe the current or last run and are keyed `stats_{attribute}`;
//! lifetime totals are keyed `stats_total_{attribute}`.
//!
//! Durations arrive in seconds and are converted to the sensor's unit:
//! hours for [`UNIT_HOURS`], minutes otherwise.

use std::fmt;
use std::sync::Arc;

use deebot_events::{EventEmitter, StatsEvent, TotalStatsEvent, VacuumBot};

use crate::base::{delegate_to_base, BaseSensor};
use crate::entity::{RenderNotifiable, SensorEntity};
use crate::sensors::UNIT_HOURS;
use crate::value::SensorValue;

/// Which statistics stream a sensor reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsType {
    /// Current or last cleaning run
    Cleaning,
    /// Lifetime totals
    Total,
}

impl StatsType {
    fn key_prefix(&self) -> &'static str {
        match self {
            StatsType::Cleaning => "stats_",
            StatsType::Total => "stats_total_",
        }
    }
}

/// Field of a statistics payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsAttribute {
    Area,
    Time,
    Type,
    Cid,
    Start,
    Cleanings,
}

impl StatsAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsAttribute::Area => "area",
            StatsAttribute::Time => "time",
            StatsAttribute::Type => "type",
            StatsAttribute::Cid => "cid",
            StatsAttribute::Start => "start",
            StatsAttribute::Cleanings => "cleanings",
        }
    }
}

impl fmt::Display for StatsAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw field read from a statistics payload
#[derive(Debug, Clone, PartialEq)]
enum StatsField {
    Number(i64),
    Seconds(u64),
    Text(String),
}

/// Statistics payloads expose their fields by attribute
trait StatsFields {
    /// `None` when the payload does not carry `attribute`
    fn field(&self, attribute: StatsAttribute) -> Option<StatsField>;
}

impl StatsFields for StatsEvent {
    fn field(&self, attribute: StatsAttribute) -> Option<StatsField> {
        match attribute {
            StatsAttribute::Area => self.area.map(|area| StatsField::Number(i64::from(area))),
            StatsAttribute::Time => self.time.map(StatsField::Seconds),
            StatsAttribute::Type => self.clean_type.clone().map(StatsField::Text),
            StatsAttribute::Cid => self.cid.clone().map(StatsField::Text),
            StatsAttribute::Start => self.start.map(StatsField::Number),
            StatsAttribute::Cleanings => None,
        }
    }
}

impl StatsFields for TotalStatsEvent {
    fn field(&self, attribute: StatsAttribute) -> Option<StatsField> {
        match attribute {
            StatsAttribute::Area => i64::try_from(self.area).ok().map(StatsField::Number),
            StatsAttribute::Time => Some(StatsField::Seconds(self.time)),
            StatsAttribute::Cleanings => {
                i64::try_from(self.cleanings).ok().map(StatsField::Number)
            }
            StatsAttribute::Type | StatsAttribute::Cid | StatsAttribute::Start => None,
        }
    }
}

/// Convert seconds to whole hours or minutes, rounding halves to even
fn convert_duration(seconds: u64, unit: Option<&str>) -> i64 {
    let divisor = if unit == Some(UNIT_HOURS) { 3600.0 } else { 60.0 };
    (seconds as f64 / divisor).round_ties_even() as i64
}

impl StatsField {
    fn into_value(self, unit: Option<&str>) -> SensorValue {
        match self {
            StatsField::Number(value) => SensorValue::Int(value),
            StatsField::Seconds(seconds) => SensorValue::Int(convert_duration(seconds, unit)),
            StatsField::Text(value) => SensorValue::Text(value),
        }
    }
}

/// One attribute of cleaning or lifetime statistics
#[derive(Debug)]
pub struct StatsSensor {
    base: BaseSensor,
    stats_type: StatsType,
    attribute: StatsAttribute,
}

impl StatsSensor {
    pub fn new(
        bot: Arc<VacuumBot>,
        stats_type: StatsType,
        attribute: StatsAttribute,
        icon: Option<&'static str>,
        unit: Option<&'static str>,
    ) -> Self {
        let key = format!("{}{}", stats_type.key_prefix(), attribute);

        Self {
            base: BaseSensor::new(bot, &key).with_icon(icon).with_unit(unit),
            stats_type,
            attribute,
        }
    }

    pub fn stats_type(&self) -> StatsType {
        self.stats_type
    }

    pub fn attribute(&self) -> StatsAttribute {
        self.attribute
    }

    pub fn base(&self) -> &BaseSensor {
        &self.base
    }

    pub fn with_enabled_by_default(mut self, enabled: bool) -> Self {
        self.base.set_enabled_by_default(enabled);
        self
    }

    fn listen_to<E>(&mut self, emitter: &EventEmitter<E>)
    where
        E: StatsFields + Send + Sync + 'static,
    {
        let attribute = self.attribute;
        let unit = self.base.unit().map(str::to_string);
        self.base.listen(emitter, move |cell, event: &E| {
            if let Some(field) = event.field(attribute) {
                cell.set_value(field.into_value(unit.as_deref()));
            }
        });
    }
}

impl SensorEntity for StatsSensor {
    delegate_to_base!();

    fn added_to_host(&mut self, notifier: Arc<dyn RenderNotifiable>) {
        self.base.activate(notifier);

        let events = self.base.bot().events();
        match self.stats_type {
            StatsType::Cleaning => {
                let stats = events.stats.clone();
                self.listen_to(&stats);
            }
            StatsType::Total => {
                let total_stats = events.total_stats.clone();
                self.listen_to(&total_stats);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::*;
    use crate::sensors::{UNIT_MINUTES, UNIT_SQUARE_METERS};

    fn activated(
        bot: &Arc<VacuumBot>,
        stats_type: StatsType,
        attribute: StatsAttribute,
        unit: Option<&'static str>,
    ) -> StatsSensor {
        let mut sensor = StatsSensor::new(Arc::clone(bot), stats_type, attribute, None, unit);
        sensor.added_to_host(RecordingNotifier::new());
        sensor
    }

    #[test]
    fn test_keys() {
        let bot = test_bot();
        let cleaning = StatsSensor::new(
            Arc::clone(&bot),
            StatsType::Cleaning,
            StatsAttribute::Area,
            Some("mdi:floor-plan"),
            Some(UNIT_SQUARE_METERS),
        );
        let total = StatsSensor::new(bot, StatsType::Total, StatsAttribute::Cleanings, None, None);

        assert_eq!(cleaning.unique_id(), "E0001_stats_area");
        assert_eq!(cleaning.name(), "Downstairs_stats_area");
        assert_eq!(total.unique_id(), "E0001_stats_total_cleanings");
    }

    #[test]
    fn test_duration_conversion() {
        assert_eq!(convert_duration(7200, Some(UNIT_HOURS)), 2);
        assert_eq!(convert_duration(120, Some(UNIT_MINUTES)), 2);
        assert_eq!(convert_duration(120, None), 2);
        // 90 min and 150 min are both exact halves
        assert_eq!(convert_duration(5400, Some(UNIT_HOURS)), 2);
        assert_eq!(convert_duration(9000, Some(UNIT_HOURS)), 2);
        assert_eq!(convert_duration(89, Some(UNIT_MINUTES)), 1);
    }

    #[test]
    fn test_cleaning_time_in_minutes() {
        let bot = test_bot();
        let sensor = activated(&bot, StatsType::Cleaning, StatsAttribute::Time, Some(UNIT_MINUTES));

        bot.events().stats.notify(StatsEvent {
            time: Some(120),
            ..Default::default()
        });
        assert_eq!(sensor.native_value(), SensorValue::Int(2));
    }

    #[test]
    fn test_total_time_in_hours() {
        let bot = test_bot();
        let sensor = activated(&bot, StatsType::Total, StatsAttribute::Time, Some(UNIT_HOURS));

        bot.events()
            .total_stats
            .notify(TotalStatsEvent::new(1000, 7200, 12));
        assert_eq!(sensor.native_value(), SensorValue::Int(2));
    }

    #[test]
    fn test_absent_field_is_ignored() {
        let bot = test_bot();
        let sensor = activated(&bot, StatsType::Cleaning, StatsAttribute::Cid, None);

        bot.events().stats.notify(StatsEvent {
            cid: Some("123".to_string()),
            ..Default::default()
        });
        bot.events().stats.notify(StatsEvent {
            area: Some(20),
            ..Default::default()
        });
        assert_eq!(sensor.native_value(), SensorValue::from("123"));
    }

    #[test]
    fn test_streams_are_not_mixed() {
        let bot = test_bot();
        let cleaning = activated(&bot, StatsType::Cleaning, StatsAttribute::Area, None);
        let total = activated(&bot, StatsType::Total, StatsAttribute::Area, None);

        bot.events()
            .total_stats
            .notify(TotalStatsEvent::new(4500, 0, 0));

        assert!(cleaning.native_value().is_unknown());
        assert_eq!(total.native_value(), SensorValue::Int(4500));
    }
}
