//! # quad-events
//!
//! Typed, process-local publish/subscribe so independently mounted UI parts
//! (map, add-location drawer, bottom navigation) can react to each other
//! without shared parent state.
//!
//! Delivery rules:
//! - synchronous: [`EventBus::publish`] returns after every listener ran
//! - at most once per active listener per emission
//! - no queueing and no replay: a listener only sees events published while
//!   it is subscribed
//! - listeners added or removed during an emission are not called for it
//!
//! A task-based consumer can use [`EventBus::stream`], which forwards the
//! chosen topics into a channel owned by that consumer.

mod event;

pub use event::{Event, Topic};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;

type Callback = Box<dyn Fn(&Event) + Send + Sync>;

struct Listener {
    id: u64,
    topic: Topic,
    active: AtomicBool,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Arc<Listener>>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        let mut listeners = self.lock();
        if let Some(pos) = listeners.iter().position(|l| l.id == id) {
            let listener = listeners.swap_remove(pos);
            listener.active.store(false, Ordering::Release);
        }
    }
}

/// Cheaply cloneable handle to one bus. Clones share listeners.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `topic`. Dropping the returned guard
    /// unsubscribes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.lock().push(Arc::new(Listener {
            id,
            topic,
            active: AtomicBool::new(true),
            callback: Box::new(callback),
        }));
        tracing::trace!(%topic, id, "listener subscribed");
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every listener currently subscribed to its topic.
    ///
    /// Returns how many listeners were called. Listeners may publish from
    /// inside their callback.
    pub fn publish(&self, event: &Event) -> usize {
        let topic = event.topic();
        let targets: Vec<Arc<Listener>> = self
            .registry
            .lock()
            .iter()
            .filter(|l| l.topic == topic)
            .cloned()
            .collect();

        let mut delivered = 0;
        for listener in targets {
            if listener.active.load(Ordering::Acquire) {
                (listener.callback)(event);
                delivered += 1;
            }
        }
        tracing::trace!(%topic, delivered, "event published");
        delivered
    }

    /// Number of active listeners on `topic`.
    #[must_use]
    pub fn listener_count(&self, topic: Topic) -> usize {
        self.registry
            .lock()
            .iter()
            .filter(|l| l.topic == topic)
            .count()
    }

    /// Forward `topics` into a channel for a single consumer task.
    #[must_use]
    pub fn stream(&self, topics: &[Topic]) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriptions = topics
            .iter()
            .map(|&topic| {
                let tx = tx.clone();
                self.subscribe(topic, move |event| {
                    // The receiver only goes away together with the stream.
                    let _ = tx.send(event.clone());
                })
            })
            .collect();
        EventStream {
            receiver: rx,
            _subscriptions: subscriptions,
        }
    }
}

/// Keeps a listener registered. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Unsubscribe now. Same as dropping the guard.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
            tracing::trace!(id = self.id, "listener unsubscribed");
        }
    }
}

/// Events forwarded from a bus, in publish order.
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<Event>,
    _subscriptions: Vec<Subscription>,
}

impl EventStream {
    /// Wait for the next forwarded event. Never returns `None` while the
    /// stream holds its own subscriptions.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Take the next event if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}
