//! Shared identity and lifecycle for every Deebot sensor
//!
//! A [`BaseSensor`] owns the sensor's value cell and its event listeners.
//! Callbacks registered through [`BaseSensor::listen`] receive the cell, not
//! the sensor, so they can run on the device library's dispatch path while
//! the host keeps ownership of the sensor itself.
//!
//! # Lifecycle
//!
//! ```text
//! new()            value = unknown, no listeners
//!   │
//! activate()       notifier stored, status stream subscribed
//!   │              (variant subscribes its own stream after this)
//!   │
//! deactivate()     all listeners unsubscribed, notifier dropped
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use deebot_events::{EventEmitter, EventListener, StatusEvent, Subscribable, VacuumBot};
use entity_store::EntityState;

use crate::entity::{DeviceRegistryInfo, RenderNotifiable};
use crate::value::SensorValue;

/// Value and auxiliary attributes, always updated together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorState {
    pub value: SensorValue,
    pub attributes: BTreeMap<String, Value>,
}

/// Static description of a sensor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDescription {
    pub name: String,
    pub unique_id: String,
    pub icon: Option<&'static str>,
    pub unit: Option<&'static str>,
}

/// Everything a render depends on, guarded together
struct CellInner {
    state: SensorState,
    notifier: Option<Arc<dyn RenderNotifiable>>,
    detached: bool,
}

/// A sensor's value cell, shared with its event callbacks
///
/// Mutation and the host render happen under one lock, so the host always
/// receives renders in the order the value changed. The notifier must not
/// call back into the cell.
pub struct SensorCell {
    description: SensorDescription,
    inner: Mutex<CellInner>,
}

impl SensorCell {
    fn new(description: SensorDescription) -> Self {
        Self {
            description,
            inner: Mutex::new(CellInner {
                state: SensorState::default(),
                notifier: None,
                detached: false,
            }),
        }
    }

    pub fn description(&self) -> &SensorDescription {
        &self.description
    }

    pub fn value(&self) -> SensorValue {
        self.inner.lock().state.value.clone()
    }

    pub fn attributes(&self) -> BTreeMap<String, Value> {
        self.inner.lock().state.attributes.clone()
    }

    /// Replace the value and ask the host to re-render
    pub fn set_value(&self, value: impl Into<SensorValue>) {
        let value = value.into();
        self.update(|state| state.value = value);
    }

    /// Mutate value and attributes, then ask the host to re-render
    ///
    /// Ignored once the sensor has been torn down.
    pub fn update(&self, mutate: impl FnOnce(&mut SensorState)) {
        let mut inner = self.inner.lock();
        if inner.detached {
            trace!(unique_id = %self.description.unique_id, "Dropping update for detached sensor");
            return;
        }

        mutate(&mut inner.state);
        trace!(
            unique_id = %self.description.unique_id,
            value = %inner.state.value,
            "Sensor value updated"
        );
        self.render(&inner);
    }

    /// Snapshot of the sensor as the host renders it
    pub fn snapshot(&self) -> EntityState {
        self.to_entity_state(&self.inner.lock().state)
    }

    /// Push the current state to the host, if attached
    pub fn write_state(&self) {
        let inner = self.inner.lock();
        self.render(&inner);
    }

    fn render(&self, inner: &CellInner) {
        if let Some(notifier) = &inner.notifier {
            notifier.write_state(self.to_entity_state(&inner.state));
        }
    }

    fn to_entity_state(&self, state: &SensorState) -> EntityState {
        EntityState {
            unique_id: self.description.unique_id.clone(),
            name: self.description.name.clone(),
            state: state.value.to_state_string(),
            attributes: state.attributes.clone(),
            unit_of_measurement: self.description.unit.map(str::to_string),
            icon: self.description.icon.map(str::to_string),
        }
    }

    fn attach(&self, notifier: Arc<dyn RenderNotifiable>) {
        let mut inner = self.inner.lock();
        inner.notifier = Some(notifier);
        inner.detached = false;
    }

    /// Waits for an in-flight update to finish; later updates are dropped
    fn detach(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.detached = true;
        inner.notifier.take().is_some()
    }
}

/// Identity, value cell and subscriptions common to every sensor
pub struct BaseSensor {
    bot: Arc<VacuumBot>,
    cell: Arc<SensorCell>,
    listeners: Vec<EventListener>,
    enabled_by_default: bool,
}

impl BaseSensor {
    /// Create a sensor for `key` on `bot`
    ///
    /// Name is `{nick or did}_{key}`, unique id is `{did}_{key}`.
    pub fn new(bot: Arc<VacuumBot>, key: &str) -> Self {
        let info = bot.device_info();
        let description = SensorDescription {
            name: format!("{}_{}", info.display_name(), key),
            unique_id: format!("{}_{}", info.did, key),
            icon: None,
            unit: None,
        };

        Self {
            bot,
            cell: Arc::new(SensorCell::new(description)),
            listeners: Vec::new(),
            enabled_by_default: false,
        }
    }

    pub fn with_icon(self, icon: Option<&'static str>) -> Self {
        self.with_description(|d| d.icon = icon)
    }

    pub fn with_unit(self, unit: Option<&'static str>) -> Self {
        self.with_description(|d| d.unit = unit)
    }

    pub fn set_enabled_by_default(&mut self, enabled: bool) {
        self.enabled_by_default = enabled;
    }

    // Only valid before activation, while nothing else holds the cell.
    fn with_description(mut self, edit: impl FnOnce(&mut SensorDescription)) -> Self {
        let mut description = self.cell.description.clone();
        edit(&mut description);
        self.cell = Arc::new(SensorCell::new(description));
        self
    }

    pub fn bot(&self) -> &Arc<VacuumBot> {
        &self.bot
    }

    pub fn cell(&self) -> &Arc<SensorCell> {
        &self.cell
    }

    pub fn name(&self) -> &str {
        &self.cell.description.name
    }

    pub fn unique_id(&self) -> &str {
        &self.cell.description.unique_id
    }

    pub fn icon(&self) -> Option<&str> {
        self.cell.description.icon
    }

    pub fn unit(&self) -> Option<&str> {
        self.cell.description.unit
    }

    pub fn value(&self) -> SensorValue {
        self.cell.value()
    }

    pub fn attributes(&self) -> BTreeMap<String, Value> {
        self.cell.attributes()
    }

    pub fn device_info(&self) -> DeviceRegistryInfo {
        DeviceRegistryInfo::for_bot(&self.bot)
    }

    pub fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    /// Whether the sensor currently holds subscriptions
    pub fn is_active(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Attach to the host and subscribe to the status stream
    ///
    /// An unavailable robot resets the value to unknown. Variants call this
    /// before subscribing their own stream.
    pub fn activate(&mut self, notifier: Arc<dyn RenderNotifiable>) {
        if self.is_active() {
            // Re-activation replaces every previous subscription
            self.deactivate();
        }

        self.cell.attach(notifier);
        let status = self.bot.events().status.clone();
        self.listen(&status, |cell, event: &StatusEvent| {
            if !event.available {
                cell.set_value(SensorValue::Unknown);
            }
        });

        debug!(unique_id = %self.unique_id(), "Sensor activated");
    }

    /// Subscribe `on_event` to `emitter`, handing it this sensor's cell
    ///
    /// The subscription is released by [`deactivate`](Self::deactivate).
    pub fn listen<E, F>(&mut self, emitter: &EventEmitter<E>, on_event: F)
    where
        E: Send + Sync + 'static,
        F: Fn(&SensorCell, &E) + Send + Sync + 'static,
    {
        let cell = Arc::clone(&self.cell);
        let listener = emitter.subscribe(move |event: &E| on_event(cell.as_ref(), event));
        self.listeners.push(listener);
    }

    /// Unsubscribe everything and detach from the host
    ///
    /// A no-op when nothing is subscribed.
    pub fn deactivate(&mut self) {
        // Detach first so a delivery racing the unsubscribe cannot write
        let was_attached = self.cell.detach();
        let released = self.listeners.len();
        for mut listener in self.listeners.drain(..) {
            listener.unsubscribe();
        }

        if released > 0 || was_attached {
            debug!(
                unique_id = %self.unique_id(),
                released,
                "Sensor deactivated"
            );
        }
    }
}

impl Drop for BaseSensor {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl std::fmt::Debug for BaseSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseSensor")
            .field("unique_id", &self.unique_id())
            .field("value", &self.value())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Generate the [`SensorEntity`](crate::entity::SensorEntity) methods every
/// variant delegates to its `base` field
macro_rules! delegate_to_base {
    () => {
        fn name(&self) -> &str {
            self.base.name()
        }

        fn unique_id(&self) -> &str {
            self.base.unique_id()
        }

        fn native_value(&self) -> $crate::value::SensorValue {
            self.base.value()
        }

        fn native_unit_of_measurement(&self) -> Option<&str> {
            self.base.unit()
        }

        fn icon(&self) -> Option<&str> {
            self.base.icon()
        }

        fn extra_state_attributes(
            &self,
        ) -> std::collections::BTreeMap<String, serde_json::Value> {
            self.base.attributes()
        }

        fn device_info(&self) -> Option<$crate::entity::DeviceRegistryInfo> {
            Some(self.base.device_info())
        }

        fn entity_registry_enabled_default(&self) -> bool {
            self.base.enabled_by_default()
        }

        fn will_remove_from_host(&mut self) {
            self.base.deactivate();
        }
    };
}

pub(crate) use delegate_to_base;


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use deebot_events::DeviceInfo;

    #[test]
    fn test_identity_uses_nick() {
        let base = BaseSensor::new(test_bot(), "water_level");
        assert_eq!(base.name(), "Downstairs_water_level");
        assert_eq!(base.unique_id(), "E0001_water_level");
    }

    #[test]
    fn test_identity_falls_back_to_did() {
        let bot = Arc::new(VacuumBot::new(DeviceInfo::new("E0002")));
        let base = BaseSensor::new(bot, "last_error");
        assert_eq!(base.name(), "E0002_last_error");
        assert_eq!(base.unique_id(), "E0002_last_error");
    }

    #[test]
    fn test_starts_unknown() {
        let base = BaseSensor::new(test_bot(), "brush");
        assert!(base.value().is_unknown());
        assert!(!base.is_active());
    }

    #[test]
    fn test_status_unavailable_resets_value() {
        let bot = test_bot();
        let notifier = RecordingNotifier::new();
        let mut base = BaseSensor::new(Arc::clone(&bot), "brush");
        base.activate(notifier.clone());

        base.cell().set_value(80.0);
        assert_eq!(base.value(), SensorValue::Float(80.0));

        bot.events().status.notify(StatusEvent::available());
        assert_eq!(base.value(), SensorValue::Float(80.0));

        bot.events().status.notify(StatusEvent::unavailable());
        assert!(base.value().is_unknown());
        assert_eq!(notifier.count(), 2);
        assert_eq!(notifier.last().map(|s| s.state), Some("unknown".to_string()));
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let bot = test_bot();
        let mut base = BaseSensor::new(Arc::clone(&bot), "brush");

        // Never activated
        base.deactivate();

        base.activate(RecordingNotifier::new());
        assert_eq!(bot.events().status.listener_count(), 1);

        base.deactivate();
        base.deactivate();
        assert_eq!(bot.events().status.listener_count(), 0);
        assert!(!base.is_active());
    }

    #[test]
    fn test_reactivation_does_not_double_subscribe() {
        let bot = test_bot();
        let mut base = BaseSensor::new(Arc::clone(&bot), "brush");

        base.activate(RecordingNotifier::new());
        base.activate(RecordingNotifier::new());
        assert_eq!(bot.events().status.listener_count(), 1);
    }

    #[test]
    fn test_drop_releases_listeners() {
        let bot = test_bot();
        {
            let mut base = BaseSensor::new(Arc::clone(&bot), "brush");
            base.activate(RecordingNotifier::new());
            assert_eq!(bot.events().listener_count(), 1);
        }
        assert_eq!(bot.events().listener_count(), 0);
    }

    #[test]
    fn test_snapshot_carries_metadata() {
        let base = BaseSensor::new(test_bot(), "brush")
            .with_icon(Some("mdi:broom"))
            .with_unit(Some("%"));
        base.cell().update(|state| state.value = SensorValue::Float(55.5));

        let snapshot = base.cell().snapshot();
        assert_eq!(snapshot.unique_id, "E0001_brush");
        assert_eq!(snapshot.state, "55.5");
        assert_eq!(snapshot.icon.as_deref(), Some("mdi:broom"));
        assert_eq!(snapshot.unit_of_measurement.as_deref(), Some("%"));
    }

    /// Notifier that holds the first render until released
    struct GatedNotifier {
        states: Mutex<Vec<EntityState>>,
        entered: Mutex<Option<std::sync::mpsc::Sender<()>>>,
        release: Mutex<Option<std::sync::mpsc::Receiver<()>>>,
    }

    impl RenderNotifiable for GatedNotifier {
        fn write_state(&self, state: EntityState) {
            let entered = self.entered.lock().take();
            let release = self.release.lock().take();
            if let (Some(entered), Some(release)) = (entered, release) {
                entered.send(()).unwrap();
                release.recv().unwrap();
            }
            self.states.lock().push(state);
        }
    }

    #[test]
    fn test_renders_follow_mutation_order_across_threads() {
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let notifier = Arc::new(GatedNotifier {
            states: Mutex::new(Vec::new()),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
        });

        let bot = test_bot();
        let mut base = BaseSensor::new(Arc::clone(&bot), "water_level");
        base.activate(notifier.clone());

        // First render parks inside the notifier
        let cell = Arc::clone(base.cell());
        let writer = std::thread::spawn(move || cell.set_value("high"));
        entered_rx.recv().unwrap();

        let status_bot = Arc::clone(&bot);
        let reset = std::thread::spawn(move || {
            status_bot.events().status.notify(StatusEvent::unavailable())
        });
        std::thread::sleep(std::time::Duration::from_millis(50));

        release_tx.send(()).unwrap();
        writer.join().unwrap();
        reset.join().unwrap();

        let rendered: Vec<String> = notifier.states.lock().iter().map(|s| s.state.clone()).collect();
        assert_eq!(rendered, vec!["high".to_string(), "unknown".to_string()]);
        assert!(base.value().is_unknown());
    }

    #[test]
    fn test_detached_cell_ignores_writes() {
        let notifier = RecordingNotifier::new();
        let mut base = BaseSensor::new(test_bot(), "brush");
        base.activate(notifier.clone());

        // A callback that was already running when the sensor was torn down
        let cell = Arc::clone(base.cell());
        base.deactivate();
        cell.set_value(42.0);

        assert!(base.value().is_unknown());
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_reactivation_accepts_writes_again() {
        let bot = test_bot();
        let mut base = BaseSensor::new(Arc::clone(&bot), "brush");
        base.activate(RecordingNotifier::new());
        base.deactivate();

        let notifier = RecordingNotifier::new();
        base.activate(notifier.clone());
        base.cell().set_value(10.0);

        assert_eq!(base.value(), SensorValue::Float(10.0));
        assert_eq!(notifier.count(), 1);
    }
}
