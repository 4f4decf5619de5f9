//! Rooms of one type, from the robot's room list
//!
//! Unlike the other sensors this one holds no subscription to a room
//! stream: the room list is a synchronous query, so the sensor is polled
//! and recomputes its value on every host update.

use std::sync::Arc;

use deebot_events::VacuumBot;

use crate::base::{delegate_to_base, BaseSensor};
use crate::entity::{RenderNotifiable, SensorEntity};
use crate::value::SensorValue;

/// Lowercase `text`, collapsing every run of other characters into `_`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Group room types by slug, keeping first-seen order
pub fn group_by_slug(room_types: Vec<String>) -> Vec<Vec<String>> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for room_type in room_types {
        let slug = slugify(&room_type);
        match groups.iter_mut().find(|(existing, _)| *existing == slug) {
            Some((_, members)) => members.push(room_type),
            None => groups.push((slug, vec![room_type])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

/// Comma-separated ids of every room whose subtype is one of the sensor's room types
///
/// Room types that share a slug, such as "Living Room" and "Living-Room",
/// share one sensor.
#[derive(Debug)]
pub struct RoomSensor {
    base: BaseSensor,
    room_types: Vec<String>,
}

impl RoomSensor {
    pub fn new(bot: Arc<VacuumBot>, room_type: impl Into<String>) -> Self {
        Self::for_room_types(bot, vec![room_type.into()])
    }

    /// One sensor covering every type in `room_types`, keyed by the first
    pub fn for_room_types(bot: Arc<VacuumBot>, room_types: Vec<String>) -> Self {
        let slug = room_types.first().map(|t| slugify(t)).unwrap_or_default();
        let key = format!("room_{}", slug);

        Self {
            base: BaseSensor::new(bot, &key),
            room_types,
        }
    }

    pub fn room_types(&self) -> &[String] {
        &self.room_types
    }

    pub fn base(&self) -> &BaseSensor {
        &self.base
    }

    pub fn with_enabled_by_default(mut self, enabled: bool) -> Self {
        self.base.set_enabled_by_default(enabled);
        self
    }

    fn current_value(&self) -> SensorValue {
        let ids: Vec<String> = self
            .base
            .bot()
            .rooms()
            .iter()
            .filter(|room| self.room_types.contains(&room.subtype))
            .map(|room| room.id.to_string())
            .collect();

        if ids.is_empty() {
            SensorValue::Unknown
        } else {
            SensorValue::Text(ids.join(","))
        }
    }

    fn refresh(&self) {
        let value = self.current_value();
        if value != self.base.value() {
            self.base.cell().set_value(value);
        }
    }
}

impl SensorEntity for RoomSensor {
    delegate_to_base!();

    fn should_poll(&self) -> bool {
        true
    }

    fn added_to_host(&mut self, notifier: Arc<dyn RenderNotifiable>) {
        self.base.activate(notifier);
        self.refresh();
    }

    fn update(&mut self) {
        // Detached sensors must not render
        if self.base.is_active() {
            self.refresh();
        }
    }
}
