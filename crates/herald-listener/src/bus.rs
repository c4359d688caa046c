//! A named-event publish/subscribe bus with sequential async delivery.
//!
//! Delivery is cooperative: `emit` awaits each subscribed handler in
//! registration order on the caller's task. The subscription table is
//! locked only to snapshot or mutate, never across an await, so handlers
//! may themselves subscribe, unsubscribe, or emit without deadlocking.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use herald_types::{DispatchError, DispatchEvent};

/// Future returned by a subscribed handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send>>;

/// A subscribed handler: takes the event, returns its outcome.
pub type Handler = Arc<dyn Fn(DispatchEvent) -> HandlerFuture + Send + Sync>;

/// Identifies one subscription on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Subscription {
    id: ListenerId,
    handler: Handler,
    once: bool,
}

/// The central event source.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Mutex<HashMap<String, Vec<Subscription>>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `event` for every firing.
    pub fn on(&self, event: impl Into<String>, handler: Handler) -> ListenerId {
        self.subscribe(event.into(), handler, false)
    }

    /// Subscribe `handler` to `event` for exactly one firing. The bus
    /// removes the subscription before delivering, so an immediate
    /// re-emit cannot fire it twice.
    pub fn once(&self, event: impl Into<String>, handler: Handler) -> ListenerId {
        self.subscribe(event.into(), handler, true)
    }

    fn subscribe(&self, event: String, handler: Handler, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_subscriptions()
            .entry(event)
            .or_default()
            .push(Subscription { id, handler, once });
        id
    }

    /// Remove a subscription. A no-op if it already fired (`once`) or was
    /// removed before.
    pub fn off(&self, event: &str, id: ListenerId) {
        let mut subs = self.lock_subscriptions();
        if let Some(list) = subs.get_mut(event) {
            list.retain(|s| s.id != id);
            if list.is_empty() {
                subs.remove(event);
            }
        }
    }

    /// Number of live subscriptions for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock_subscriptions()
            .get(event)
            .map(|l| l.len())
            .unwrap_or(0)
    }

    /// Deliver `event` to every subscriber, sequentially, in registration
    /// order.
    ///
    /// A handler returning `Err` is logged and does not stop delivery to
    /// later subscribers. Handlers loaded through a
    /// [`ListenerSet`](crate::listener::ListenerSet) never return `Err`
    /// here; their wrapper converts failures into `listener_error` events
    /// first.
    pub async fn emit(&self, event: DispatchEvent) {
        let name = event.event_name();
        let batch: Vec<(ListenerId, Handler)> = {
            let mut subs = self.lock_subscriptions();
            let Some(list) = subs.get_mut(name) else {
                return;
            };
            let batch = list
                .iter()
                .map(|s| (s.id, Arc::clone(&s.handler)))
                .collect();
            // once-subscriptions are consumed by this delivery.
            list.retain(|s| !s.once);
            if list.is_empty() {
                subs.remove(name);
            }
            batch
        };

        for (id, handler) in batch {
            if let Err(err) = handler(event.clone()).await {
                tracing::warn!(
                    event = name,
                    listener_id = id.0,
                    error = %err,
                    "event handler failed"
                );
            }
        }
    }

    fn lock_subscriptions(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Subscription>>> {
        self.subscriptions.lock().unwrap_or_else(|e| e.into_inner())
    }
}
