//! Synchronous publish/subscribe bus

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{Event, EventKind, Listener};

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by every subscription, used with [`EventBus::off`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Topic {
    Kind(EventKind),
    All,
}

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    once: bool,
    handler: Handler,
}

/// Event bus with per-kind and wildcard subscriptions.
///
/// Dispatch is synchronous: `emit` returns after every matching handler ran.
/// Handlers for the specific kind run first, in subscription order, followed
/// by wildcard handlers. Handlers may subscribe or unsubscribe while an event
/// is being dispatched; the change applies from the next `emit`.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every occurrence of `kind`
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert(Topic::Kind(kind), false, Arc::new(handler))
    }

    /// Subscribe to the next occurrence of `kind` only
    pub fn once<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert(Topic::Kind(kind), true, Arc::new(handler))
    }

    /// Subscribe to every event regardless of kind
    pub fn on_any<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert(Topic::All, false, Arc::new(handler))
    }

    /// Attach a typed listener as a wildcard subscription
    pub fn subscribe(&self, listener: Arc<dyn Listener>) -> SubscriptionId {
        self.on_any(move |event| listener.on_event(event))
    }

    /// Remove one subscription. Returns false if it was already gone.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.lock();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// Remove every subscription for `kind`, or all of them with `None`
    pub fn clear(&self, kind: Option<EventKind>) {
        let mut subscriptions = self.lock();
        match kind {
            Some(kind) => subscriptions.retain(|s| s.topic != Topic::Kind(kind)),
            None => subscriptions.clear(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    pub fn emit(&self, event: &Event) {
        let kind = event.kind();
        let handlers: Vec<Handler> = {
            let mut subscriptions = self.lock();
            let specific = subscriptions
                .iter()
                .filter(|s| s.topic == Topic::Kind(kind))
                .map(|s| s.handler.clone());
            let wildcard = subscriptions
                .iter()
                .filter(|s| s.topic == Topic::All)
                .map(|s| s.handler.clone());
            let handlers = specific.chain(wildcard).collect();

            subscriptions.retain(|s| !(s.once && s.topic == Topic::Kind(kind)));
            handlers
        };

        for handler in handlers {
            handler(event);
        }
    }

    fn insert(&self, topic: Topic, once: bool, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Subscription {
            id,
            topic,
            once,
            handler,
        });
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
