//! Event emitters and listener handles
//!
//! Every event stream on a [`VacuumBot`](crate::VacuumBot) is an
//! [`EventEmitter<E>`]. Consumers register a callback through the
//! [`Subscribable`] capability and keep the returned [`EventListener`] alive
//! for as long as they want deliveries.
//!
//! Delivery is inline: [`EventEmitter::notify`] runs every active callback on
//! the caller's thread, in subscription order, before returning.
//!
//! # Example
//!
//! ```rust
//! use deebot_events::{EventEmitter, Subscribable, ErrorEvent};
//! use std::sync::atomic::{AtomicI32, Ordering};
//! use std::sync::Arc;
//!
//! let emitter = EventEmitter::<ErrorEvent>::new("error");
//! let last_code = Arc::new(AtomicI32::new(0));
//!
//! let seen = Arc::clone(&last_code);
//! let mut listener = emitter.subscribe(move |event: &ErrorEvent| {
//!     seen.store(event.code, Ordering::SeqCst);
//! });
//!
//! emitter.notify(ErrorEvent::new(5, Some("stuck")));
//! assert_eq!(last_code.load(Ordering::SeqCst), 5);
//!
//! listener.unsubscribe();
//! emitter.notify(ErrorEvent::new(7, None::<String>));
//! assert_eq!(last_code.load(Ordering::SeqCst), 5);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, trace};

/// Callback invoked for every delivered event
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Hook run when a stream gains its first listener
pub type RefreshHook = Arc<dyn Fn() + Send + Sync>;

/// Identifier of a single registration on an emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Capability of something that delivers events of type `E` to listeners
pub trait Subscribable<E> {
    /// Register `callback`, returning the handle that keeps it registered
    fn subscribe<F>(&self, callback: F) -> EventListener
    where
        F: Fn(&E) + Send + Sync + 'static;
}

struct Registration<E> {
    id: ListenerId,
    active: Arc<AtomicBool>,
    callback: Callback<E>,
}

struct EmitterInner<E> {
    stream: &'static str,
    listeners: RwLock<Vec<Registration<E>>>,
    next_id: AtomicU64,
    on_first_subscription: RwLock<Option<RefreshHook>>,
}

impl<E> EmitterInner<E> {
    fn detach(&self, id: ListenerId) {
        let remaining = {
            let mut listeners = self.listeners.write();
            let before = listeners.len();
            listeners.retain(|registration| registration.id != id);
            if listeners.len() == before {
                return;
            }
            listeners.len()
        };

        debug!(
            stream = self.stream,
            "Listener count for {}: {} -> {}",
            self.stream,
            remaining + 1,
            remaining
        );
    }
}

/// A named stream of events of one kind
///
/// Cloning an emitter yields another handle onto the same stream.
pub struct EventEmitter<E> {
    inner: Arc<EmitterInner<E>>,
}

impl<E: Send + Sync + 'static> EventEmitter<E> {
    /// Create an emitter for the stream called `stream`
    pub fn new(stream: &'static str) -> Self {
        Self {
            inner: Arc::new(EmitterInner {
                stream,
                listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
                on_first_subscription: RwLock::new(None),
            }),
        }
    }

    /// Create an emitter that runs `hook` whenever its listener count goes from zero to one
    ///
    /// The device library uses this to ask the robot for the current value
    /// as soon as somebody is interested in it.
    pub fn with_refresh<F>(stream: &'static str, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let emitter = Self::new(stream);
        emitter.set_refresh_hook(hook);
        emitter
    }

    /// Replace the first-subscription hook
    pub fn set_refresh_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.inner.on_first_subscription.write() = Some(Arc::new(hook));
    }

    /// Name of the stream
    pub fn stream(&self) -> &'static str {
        self.inner.stream
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Whether anybody is listening
    pub fn has_listeners(&self) -> bool {
        self.listener_count() > 0
    }

    /// Deliver `event` to every active listener
    ///
    /// Callbacks run synchronously on the calling thread, in the order they
    /// subscribed. The listener list is not locked while callbacks run, so a
    /// callback may subscribe or unsubscribe freely.
    pub fn notify(&self, event: E) {
        let targets: Vec<(Arc<AtomicBool>, Callback<E>)> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|r| (Arc::clone(&r.active), Arc::clone(&r.callback)))
            .collect();

        trace!(
            stream = self.inner.stream,
            listeners = targets.len(),
            "Delivering event"
        );

        for (active, callback) in targets {
            // A listener may be unsubscribed by an earlier callback in this loop.
            if active.load(Ordering::Acquire) {
                callback(&event);
            }
        }
    }
}

impl<E: Send + Sync + 'static> Subscribable<E> for EventEmitter<E> {
    fn subscribe<F>(&self, callback: F) -> EventListener
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let active = Arc::new(AtomicBool::new(true));

        let count = {
            let mut listeners = self.inner.listeners.write();
            listeners.push(Registration {
                id,
                active: Arc::clone(&active),
                callback: Arc::new(callback),
            });
            listeners.len()
        };

        debug!(
            stream = self.inner.stream,
            "Listener count for {}: {} -> {}",
            self.inner.stream,
            count - 1,
            count
        );

        if count == 1 {
            let hook = self.inner.on_first_subscription.read().clone();
            if let Some(hook) = hook {
                debug!(stream = self.inner.stream, "First listener, requesting refresh");
                hook();
            }
        }

        let weak: Weak<EmitterInner<E>> = Arc::downgrade(&self.inner);
        EventListener {
            id,
            stream: self.inner.stream,
            active,
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.detach(id);
                }
            })),
        }
    }
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("stream", &self.inner.stream)
            .field("listener_count", &self.inner.listeners.read().len())
            .finish()
    }
}

/// Handle for one registration on an [`EventEmitter`]
///
/// Dropping the handle unsubscribes the callback.
#[must_use = "dropping an EventListener unsubscribes it"]
pub struct EventListener {
    id: ListenerId,
    stream: &'static str,
    active: Arc<AtomicBool>,
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl EventListener {
    /// Stop receiving events
    ///
    /// Safe to call more than once. Deliveries that start after this returns
    /// skip the callback, including later steps of a delivery on the same
    /// thread. A delivery on another thread that already passed its check may
    /// still be running the callback; callers that need a hard stop guard
    /// their own state.
    pub fn unsubscribe(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(detach) = self.detach.take() {
            trace!(stream = self.stream, id = self.id.0, "Unsubscribing listener");
            detach();
        }
    }

    /// Whether the callback is still registered
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stream this listener is registered on
    pub fn stream(&self) -> &'static str {
        self.stream
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("id", &self.id)
            .field("stream", &self.stream)
            .field("active", &self.is_active())
            .finish()
    }
}
